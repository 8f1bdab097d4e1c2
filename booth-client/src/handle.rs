//! Handle for background booth loops.

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Owns a spawned polling, refresh or scroll loop.
///
/// Dropping the handle cancels the loop, so a screen that goes away can never
/// leave a timer running.
#[derive(Debug)]
pub struct SessionHandle {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl SessionHandle {
    pub(crate) fn new(
        name: &'static str,
        handle: JoinHandle<()>,
        shutdown_tx: oneshot::Sender<()>,
    ) -> Self {
        Self {
            name,
            handle: Some(handle),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Name of the loop, for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        match &self.handle {
            Some(handle) => handle.is_finished(),
            None => true,
        }
    }

    /// Signal the loop to stop without waiting for it.
    pub fn cancel(mut self) {
        self.signal();
    }

    /// Signal the loop to stop and wait until it has exited.
    ///
    /// No callback fires after this returns.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::warn!(task = self.name, error = %e, "Loop ended abnormally");
                }
            }
        }
    }

    /// Abort the loop without graceful shutdown.
    pub fn abort(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    fn signal(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        // Abort as backup
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.signal();
    }
}
