use std::io::{self, Write};
use std::ops::Range;

use crossterm::cursor::MoveToPreviousLine;
use crossterm::event::{KeyCode, KeyEvent};
use crossterm::queue;
use crossterm::style::Stylize;
use crossterm::terminal::{self, Clear, ClearType};

use crate::commands::terminal::{InputEvent, KeyInput, KeyReader, RawModeGuard, is_cancel_key};
use crate::error::{GitSquashError, ValidationError};
use crate::git::log::{CommitRecord, truncate_subject};
use crate::utils::{Cancellation, debug_log};

const DEFAULT_TERMINAL_HEIGHT: u16 = 20;
/// Instruction line, column header and padding.
const RESERVED_ROWS: usize = 4;
const MIN_VISIBLE_ROWS: usize = 3;

const INSTRUCTION: &str =
    "Select a first included commit (use arrow keys, Enter to select, Esc to cancel):";
const COLUMN_HEADER: &str = "HASH   AUTHOR        TIME                 MESSAGE";

/// Rows available for commits given the terminal height, if known.
pub fn visible_rows(terminal_height: Option<u16>) -> usize {
    let height = terminal_height.unwrap_or(DEFAULT_TERMINAL_HEIGHT) as usize;
    height.saturating_sub(RESERVED_ROWS).max(MIN_VISIBLE_ROWS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKey {
    Up,
    Down,
    Confirm,
    Cancel,
    Ignored,
}

impl PickerKey {
    pub fn from_key_event(key: &KeyEvent) -> Self {
        if is_cancel_key(key) {
            return PickerKey::Cancel;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => PickerKey::Up,
            KeyCode::Down | KeyCode::Char('j') => PickerKey::Down,
            KeyCode::Enter | KeyCode::Char(' ') => PickerKey::Confirm,
            _ => PickerKey::Ignored,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerOutcome {
    Confirmed(usize),
    Cancelled,
}

/// Cursor and scroll position over a non-empty candidate list.
///
/// Keeps `window_start <= cursor < window_start + visible_rows` and
/// `cursor < len` across every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    cursor: usize,
    window_start: usize,
    visible_rows: usize,
    len: usize,
}

impl SelectionState {
    pub fn new(len: usize, visible_rows: usize) -> Self {
        Self {
            cursor: 0,
            window_start: 0,
            visible_rows: visible_rows.max(1),
            len,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn window_start(&self) -> usize {
        self.window_start
    }

    /// Indices of the rows currently on screen.
    pub fn visible_range(&self) -> Range<usize> {
        self.window_start..(self.window_start + self.visible_rows).min(self.len)
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            if self.cursor < self.window_start {
                self.window_start -= 1;
            }
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.len {
            self.cursor += 1;
            if self.cursor >= self.window_start + self.visible_rows {
                self.window_start += 1;
            }
        }
    }

    pub fn apply(&mut self, key: PickerKey) -> Option<PickerOutcome> {
        match key {
            PickerKey::Up => self.move_up(),
            PickerKey::Down => self.move_down(),
            PickerKey::Confirm => return Some(PickerOutcome::Confirmed(self.cursor)),
            PickerKey::Cancel => return Some(PickerOutcome::Cancelled),
            PickerKey::Ignored => {}
        }
        None
    }
}

/// Terminal geometry the picker draws into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerLayout {
    pub visible_rows: usize,
    pub subject_width: usize,
    /// Terminal width; `None` leaves rows unclipped.
    pub columns: Option<usize>,
}

impl PickerLayout {
    pub fn new(visible_rows: usize, subject_width: usize) -> Self {
        Self {
            visible_rows,
            subject_width,
            columns: None,
        }
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Size the picker to the controlling terminal, with defaults when it
    /// cannot be queried.
    pub fn for_terminal(subject_width: usize) -> Self {
        let size = terminal::size().ok();
        let layout = Self::new(visible_rows(size.map(|(_, height)| height)), subject_width);
        match size {
            Some((width, _)) => layout.with_columns(width as usize),
            None => layout,
        }
    }

    /// Characters a full line may hold. The last column stays empty so the
    /// terminal never wraps at the margin.
    fn line_budget(&self) -> Option<usize> {
        self.columns.map(|c| c.saturating_sub(1).max(1))
    }

    /// Characters left for a commit row after its two-column marker.
    fn row_budget(&self) -> Option<usize> {
        self.line_budget().map(|b| b.saturating_sub(2))
    }
}

/// Row fields, each carrying its leading separator, so that clipping by
/// characters clips the rendered row exactly.
fn row_fields(commit: &CommitRecord, subject_width: usize) -> [String; 4] {
    [
        commit.short_hash.clone(),
        format!(" {:<13}", commit.author),
        format!(" {:<20}", commit.relative_time),
        format!(" {}", truncate_subject(&commit.subject, subject_width)),
    ]
}

fn clip_fields(fields: [String; 4], budget: Option<usize>) -> [String; 4] {
    let Some(mut remaining) = budget else {
        return fields;
    };
    fields.map(|field| {
        let kept: String = field.chars().take(remaining).collect();
        remaining -= kept.chars().count();
        kept
    })
}

fn clip(text: &str, budget: Option<usize>) -> String {
    match budget {
        Some(budget) => text.chars().take(budget).collect(),
        None => text.to_string(),
    }
}

/// Uncolored row text: hash, padded author and time, one-line subject.
pub fn plain_commit_line(commit: &CommitRecord, subject_width: usize) -> String {
    row_fields(commit, subject_width).concat()
}

fn styled_commit_line([hash, author, time, subject]: [String; 4]) -> String {
    format!(
        "{}{}{}{}",
        hash.dark_yellow(),
        author.dark_green(),
        time.dark_cyan(),
        subject.grey()
    )
}

/// Draws the picker block and remembers its height so the next frame can
/// erase exactly what was drawn. Every line is clipped to the terminal
/// width, so one drawn line is one screen line.
struct PickerView<'a> {
    commits: &'a [CommitRecord],
    layout: PickerLayout,
    drawn_lines: usize,
}

impl<'a> PickerView<'a> {
    fn new(commits: &'a [CommitRecord], layout: PickerLayout) -> Self {
        Self {
            commits,
            layout,
            drawn_lines: 0,
        }
    }

    fn draw<W: Write>(&mut self, out: &mut W, state: &SelectionState) -> io::Result<()> {
        self.erase(out)?;

        let line_budget = self.layout.line_budget();
        let row_budget = self.layout.row_budget();
        write!(out, "{}\r\n", clip(INSTRUCTION, line_budget).magenta())?;
        write!(out, "{}\r\n", clip(COLUMN_HEADER, line_budget).white().bold())?;
        let mut lines = 2;
        for i in state.visible_range() {
            let fields = clip_fields(
                row_fields(&self.commits[i], self.layout.subject_width),
                row_budget,
            );
            if i == state.cursor() {
                write!(out, "> {}\r\n", fields.concat().white().on_dark_blue())?;
            } else {
                write!(out, "  {}\r\n", styled_commit_line(fields))?;
            }
            lines += 1;
        }
        self.drawn_lines = lines;
        out.flush()
    }

    fn erase<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        for _ in 0..self.drawn_lines {
            queue!(out, MoveToPreviousLine(1), Clear(ClearType::CurrentLine))?;
        }
        self.drawn_lines = 0;
        out.flush()
    }
}

/// Run the picker state machine over `input` until the user confirms or
/// cancels, repainting `out` after every key.
pub async fn drive_picker<W: Write>(
    commits: &[CommitRecord],
    layout: PickerLayout,
    input: &KeyInput,
    cancel: &Cancellation,
    out: &mut W,
) -> Result<CommitRecord, GitSquashError> {
    if commits.is_empty() {
        return Err(ValidationError::NoCommitSelected.into());
    }

    let mut state = SelectionState::new(commits.len(), layout.visible_rows);
    let mut view = PickerView::new(commits, layout);
    view.draw(out, &state)?;

    loop {
        match input.next(cancel).await {
            InputEvent::Cancelled => {
                view.erase(out)?;
                return Err(GitSquashError::Cancelled);
            }
            InputEvent::Error(e) => {
                view.erase(out)?;
                return Err(GitSquashError::Interaction(format!("keyboard error: {}", e)));
            }
            InputEvent::Key(key) => match state.apply(PickerKey::from_key_event(&key)) {
                Some(PickerOutcome::Confirmed(index)) => {
                    view.erase(out)?;
                    debug_log(&format!("Picked commit {}", commits[index].short_hash));
                    return Ok(commits[index].clone());
                }
                Some(PickerOutcome::Cancelled) => {
                    view.erase(out)?;
                    return Err(GitSquashError::AbortedByUser);
                }
                None => view.draw(out, &state)?,
            },
        }
    }
}

/// Interactive commit selection on the controlling terminal.
pub fn pick_commit(
    commits: &[CommitRecord],
    subject_width: usize,
    cancel: &Cancellation,
) -> Result<CommitRecord, GitSquashError> {
    let layout = PickerLayout::for_terminal(subject_width);

    let _raw_mode = RawModeGuard::acquire()?;
    let reader = KeyReader::spawn(cancel);
    let mut stdout = io::stdout();

    smol::block_on(async move {
        let result = drive_picker(commits, layout, reader.input(), cancel, &mut stdout).await;
        reader.shutdown().await;
        result
    })
}
