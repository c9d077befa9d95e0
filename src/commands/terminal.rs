use std::io;
use std::time::Duration;

use crossterm::cursor;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use futures::FutureExt;
use smol::Task;
use smol::channel::{Receiver, Sender};

use crate::error::GitSquashError;
use crate::utils::{Cancellation, debug_log};

/// How long the reader waits for input before re-checking its stop signals.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Keyboard capture for the lifetime of the guard; released on drop, whatever
/// the exit path.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn acquire() -> Result<Self, GitSquashError> {
        enable_raw_mode()
            .map_err(|e| GitSquashError::Interaction(format!("failed to open keyboard: {}", e)))?;
        let guard = RawModeGuard { _private: () };
        let _ = execute!(io::stdout(), cursor::Hide);
        Ok(guard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show);
        let _ = disable_raw_mode();
    }
}

/// What the driver loop woke up for.
#[derive(Debug)]
pub enum InputEvent {
    Key(KeyEvent),
    Error(String),
    Cancelled,
}

/// Receiving side of the key reader: one slot for keys, one for read errors.
pub struct KeyInput {
    keys: Receiver<KeyEvent>,
    errors: Receiver<io::Error>,
}

impl KeyInput {
    pub fn from_channels(keys: Receiver<KeyEvent>, errors: Receiver<io::Error>) -> Self {
        Self { keys, errors }
    }

    /// Wait for the next key, a read error or cancellation, whichever comes first.
    pub async fn next(&self, cancel: &Cancellation) -> InputEvent {
        let key = self.keys.recv().fuse();
        let error = self.errors.recv().fuse();
        let cancelled = cancel.cancelled().fuse();
        futures::pin_mut!(key, error, cancelled);

        loop {
            futures::select! {
                _ = cancelled => return InputEvent::Cancelled,
                key = key => return match key {
                    Ok(key) => InputEvent::Key(key),
                    Err(_) => closed(cancel),
                },
                error = error => match error {
                    Ok(e) => return InputEvent::Error(e.to_string()),
                    // error side hung up; keys may still be buffered
                    Err(_) => continue,
                },
            }
        }
    }

    fn close(&self) {
        self.keys.close();
        self.errors.close();
    }
}

fn closed(cancel: &Cancellation) -> InputEvent {
    if cancel.is_cancelled() {
        InputEvent::Cancelled
    } else {
        InputEvent::Error("keyboard input closed".to_string())
    }
}

/// Blocking keyboard reads on a dedicated thread, handed to the driver one
/// key at a time.
pub struct KeyReader {
    input: KeyInput,
    stop: Cancellation,
    task: Task<()>,
}

impl KeyReader {
    pub fn spawn(cancel: &Cancellation) -> Self {
        let (key_tx, key_rx) = smol::channel::bounded(1);
        let (err_tx, err_rx) = smol::channel::bounded(1);
        let stop = Cancellation::new();

        let reader_stop = stop.clone();
        let reader_cancel = cancel.clone();
        let task = smol::unblock(move || read_keys(key_tx, err_tx, reader_stop, reader_cancel));

        Self {
            input: KeyInput::from_channels(key_rx, err_rx),
            stop,
            task,
        }
    }

    pub fn input(&self) -> &KeyInput {
        &self.input
    }

    /// Stop the reader and wait for its thread, so no later keystroke is consumed.
    pub async fn shutdown(self) {
        self.stop.cancel();
        self.input.close();
        self.task.await;
    }
}

fn read_keys(
    keys: Sender<KeyEvent>,
    errors: Sender<io::Error>,
    stop: Cancellation,
    cancel: Cancellation,
) {
    loop {
        if stop.is_cancelled() || cancel.is_cancelled() {
            return;
        }
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                let _ = errors.send_blocking(e);
                return;
            }
        }
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if keys.send_blocking(key).is_err() {
                    debug_log("key receiver gone, stopping reader");
                    return;
                }
            }
            Ok(_) => {}
            Err(e) => {
                let _ = errors.send_blocking(e);
                return;
            }
        }
    }
}

/// Esc, Ctrl-C, Ctrl-D, or the raw ETX/EOT bytes some terminals pass through.
pub fn is_cancel_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => true,
        KeyCode::Char('c') | KeyCode::Char('d') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('\u{3}') | KeyCode::Char('\u{4}') => true,
        _ => false,
    }
}
