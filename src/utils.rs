use smol::channel::{Receiver, Sender};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "GIT_SQUASH_LOG";

/// Install the stderr tracing subscriber. Safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

pub fn debug_log(msg: &str) {
    tracing::debug!("{}", msg);
}

/// Cooperative cancellation shared between the driver loop, the key reader and
/// the interrupt handler. Cancelling closes the underlying channel, which wakes
/// every pending `cancelled()` future at once.
#[derive(Clone, Debug)]
pub struct Cancellation {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellation {
    pub fn new() -> Self {
        let (tx, rx) = smol::channel::bounded(1);
        Self { tx, rx }
    }

    pub fn cancel(&self) {
        self.tx.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.is_closed()
    }

    /// Resolves once `cancel()` has been called on any clone.
    pub async fn cancelled(&self) {
        // Nothing is ever sent, so recv only returns once the channel closes.
        let _ = self.rx.recv().await;
    }
}
