//! The textual progress surface the host shows the user.

use tracing::{error, info};

/// Receives progress text, the loading-indicator state and fatal
/// alerts. The host typically wires this to a DOM region or a terminal.
pub trait StatusSink {
    /// Show a progress message.
    fn progress(&mut self, msg: &str);
    /// Show or hide the transient loading indicator.
    fn loading(&mut self, on: bool);
    /// Surface a fatal, user-visible error.
    fn alert(&mut self, msg: &str);
}

/// A sink that forwards everything to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn progress(&mut self, msg: &str) {
        info!("{}", msg);
    }

    fn loading(&mut self, on: bool) {
        info!(loading = on);
    }

    fn alert(&mut self, msg: &str) {
        error!("{}", msg);
    }
}
