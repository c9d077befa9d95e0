use std::io::{self, IsTerminal, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use futures::FutureExt;

use crate::commands::terminal::{InputEvent, KeyInput, KeyReader, RawModeGuard, is_cancel_key};
use crate::error::GitSquashError;
use crate::git::log::CommitRecord;
use crate::utils::Cancellation;

/// Single-line text buffer with a char-indexed cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEditor {
    chars: Vec<char>,
    cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditResult {
    Continue,
    Submit(String),
    Abort,
}

impl LineEditor {
    /// Starts with `initial` in the buffer and the cursor at its end.
    pub fn new(initial: &str) -> Self {
        let chars: Vec<char> = initial.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> EditResult {
        if is_cancel_key(key) {
            return EditResult::Abort;
        }
        match key.code {
            KeyCode::Enter => return EditResult::Submit(self.text()),
            KeyCode::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL) && !c.is_control() =>
            {
                self.chars.insert(self.cursor, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.chars.remove(self.cursor - 1);
                    self.cursor -= 1;
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.chars.len() {
                    self.chars.remove(self.cursor);
                }
            }
            KeyCode::Left => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
            }
            KeyCode::Right => {
                if self.cursor < self.chars.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.chars.len(),
            _ => {}
        }
        EditResult::Continue
    }
}

pub fn prompt_prefix(selected: Option<&CommitRecord>) -> String {
    match selected {
        Some(commit) => format!("Commit message [{}]: ", commit.subject),
        None => "Commit message: ".to_string(),
    }
}

/// The slice of `prefix` and buffer that fits in `columns`, scrolled
/// horizontally so the cursor stays on screen, plus the cursor's column in it.
/// The last column stays empty so the line never wraps.
fn visible_line(prefix: &str, editor: &LineEditor, columns: Option<usize>) -> (String, usize) {
    let line: Vec<char> = prefix.chars().chain(editor.text().chars()).collect();
    let cursor = prefix.chars().count() + editor.cursor();
    let Some(columns) = columns else {
        return (line.into_iter().collect(), cursor);
    };
    let budget = columns.saturating_sub(1).max(1);
    let start = cursor.saturating_sub(budget - 1);
    let end = (start + budget).min(line.len());
    (line[start..end].iter().collect(), cursor - start)
}

fn redraw<W: Write>(
    out: &mut W,
    prefix: &str,
    editor: &LineEditor,
    columns: Option<usize>,
) -> io::Result<()> {
    let (visible, column) = visible_line(prefix, editor, columns);
    queue!(
        out,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(visible),
        MoveToColumn(column.min(u16::MAX as usize) as u16)
    )?;
    out.flush()
}

/// Edit `initial` under `prefix` until Enter, an abort key, or cancellation.
/// An empty submission counts as an abort. With `columns` set, the line
/// scrolls sideways instead of wrapping.
pub async fn drive_message_prompt<W: Write>(
    prefix: &str,
    initial: &str,
    columns: Option<usize>,
    input: &KeyInput,
    cancel: &Cancellation,
    out: &mut W,
) -> Result<String, GitSquashError> {
    let mut editor = LineEditor::new(initial);
    redraw(out, prefix, &editor, columns)?;

    let result = loop {
        match input.next(cancel).await {
            InputEvent::Cancelled => break Err(GitSquashError::Cancelled),
            InputEvent::Error(e) => {
                break Err(GitSquashError::Interaction(format!("keyboard error: {}", e)));
            }
            InputEvent::Key(key) => match editor.handle_key(&key) {
                EditResult::Continue => redraw(out, prefix, &editor, columns)?,
                EditResult::Submit(text) if text.is_empty() => {
                    break Err(GitSquashError::AbortedByUser);
                }
                EditResult::Submit(text) => break Ok(text),
                EditResult::Abort => break Err(GitSquashError::AbortedByUser),
            },
        }
    };

    write!(out, "\r\n")?;
    out.flush()?;
    result
}

/// Ask for the squashed commit's message, pre-filled with the selected
/// commit's subject when stdin is a terminal.
pub fn prompt_commit_message(
    selected: Option<&CommitRecord>,
    cancel: &Cancellation,
) -> Result<String, GitSquashError> {
    let Some(commit) = selected.filter(|_| io::stdin().is_terminal()) else {
        return read_plain_line(&prompt_prefix(None), cancel);
    };

    let prefix = prompt_prefix(Some(commit));
    let columns = terminal::size().ok().map(|(width, _)| width as usize);
    let _raw_mode = RawModeGuard::acquire()?;
    let reader = KeyReader::spawn(cancel);
    let mut stdout = io::stdout();
    let initial = commit.subject.clone();

    smol::block_on(async move {
        let result =
            drive_message_prompt(&prefix, &initial, columns, reader.input(), cancel, &mut stdout)
                .await;
        reader.shutdown().await;
        result
    })
}

/// Line-buffered fallback for non-interactive stdin. EOF aborts.
fn read_plain_line(prefix: &str, cancel: &Cancellation) -> Result<String, GitSquashError> {
    print!("{}", prefix);
    io::stdout().flush()?;

    let read = smol::unblock(|| {
        let mut line = String::new();
        io::stdin().read_line(&mut line).map(|n| (n, line))
    });

    smol::block_on(async {
        let read = read.fuse();
        let cancelled = cancel.cancelled().fuse();
        futures::pin_mut!(read, cancelled);
        futures::select! {
            _ = cancelled => Err(GitSquashError::Cancelled),
            res = read => match res {
                Ok((0, _)) => Err(GitSquashError::AbortedByUser),
                Ok((_, line)) => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
                Err(e) => Err(GitSquashError::Interaction(format!(
                    "failed to read commit message: {}",
                    e
                ))),
            },
        }
    })
}
