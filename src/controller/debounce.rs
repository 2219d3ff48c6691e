//! Trailing-edge debounce on the tokio timer.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Window for free-text search input.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

struct Scheduled {
    handle: JoinHandle<()>,
    /// Set once the window has elapsed and the action started.
    fired: Arc<AtomicBool>,
}

/// Runs only the last action submitted within a quiet window. Submitting again restarts the
/// window and drops the previously pending action. An action that already started is left
/// to finish.
pub struct Debouncer {
    window: Duration,
    pending: Mutex<Option<Scheduled>>,
    /// Started actions superseded by a newer call.
    running: Mutex<Vec<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Debouncer {
            window,
            pending: Mutex::new(None),
            running: Mutex::new(Vec::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Must be called inside a tokio runtime.
    pub fn call<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let window = self.window;
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            flag.store(true, Ordering::SeqCst);
            action.await;
        });
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Scheduled { handle, fired });
        if let Some(previous) = previous {
            if previous.fired.load(Ordering::SeqCst) {
                let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
                running.retain(|h| !h.is_finished());
                running.push(previous.handle);
            } else {
                previous.handle.abort();
            }
        }
    }

    /// Drop the pending action if it has not started yet.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.as_ref().map(|p| !p.fired.load(Ordering::SeqCst)).unwrap_or(false) {
            if let Some(p) = pending.take() {
                p.handle.abort();
            }
        }
    }

    /// Wait for the pending action to fire and finish, along with any started action it
    /// superseded.
    pub async fn flush(&self) {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(p) = pending {
            // Aborted by a newer call in the meantime; nothing to wait for.
            let _ = p.handle.await;
        }
        let running = std::mem::take(&mut *self.running.lock().unwrap_or_else(PoisonError::into_inner));
        for h in running {
            let _ = h.await;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|p| !p.handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(p) = self.pending.lock().unwrap_or_else(PoisonError::into_inner).take() {
            p.handle.abort();
        }
        for h in self.running.lock().unwrap_or_else(PoisonError::into_inner).drain(..) {
            h.abort();
        }
    }
}
