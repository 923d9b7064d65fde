//! Editor-side save helpers: keystroke debouncing and the bounded retry
//! used while an optimistic create is still settling.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Cap on retries while waiting for a slot's entry to materialize.
pub const MAX_SAVE_ATTEMPTS: u32 = 50;

const RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Coalesces rapid edits into one save. Each call bumps a generation
/// counter; only the task that still holds the latest generation after the
/// debounce window fires.
#[derive(Debug)]
pub struct DebouncedSaver {
    generation: Arc<AtomicU64>,
    delay: Duration,
}

impl Default for DebouncedSaver {
    fn default() -> Self {
        Self::new()
    }
}

impl DebouncedSaver {
    pub fn new() -> Self {
        Self::with_delay(SAVE_DEBOUNCE)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            delay,
        }
    }

    /// Schedules `save` after the debounce window. Returns whether the
    /// save actually ran, for callers that await the handle.
    pub fn schedule<F, Fut>(&self, save: F) -> JoinHandle<bool>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) != mine {
                return false;
            }
            save().await;
            true
        })
    }

    /// Drops whatever save is pending, e.g. when the editor closes without
    /// changes.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Polls `attempt` until it yields a value, giving up after
/// `MAX_SAVE_ATTEMPTS` rounds.
pub async fn retry_until<F, Fut, T>(mut attempt: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for _ in 0..MAX_SAVE_ATTEMPTS {
        if let Some(value) = attempt().await {
            return Some(value);
        }
        tokio::time::sleep(RETRY_INTERVAL).await;
    }
    warn!("gave up waiting for pending save to settle");
    None
}
