//! Trailing-edge debounce on the tokio clock

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::{Error, Result};

/// Runs only the last scheduled action once a quiet period has elapsed
///
/// Each `schedule` call restarts the timer; an action whose ticket is no
/// longer the newest when its timer fires is dropped.
#[derive(Clone)]
pub struct Debouncer {
    interval: Duration,
    generation: Arc<AtomicU64>,
    handle: Handle,
}

impl Debouncer {
    /// Bind to the runtime the caller is running on
    pub fn new(interval: Duration) -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| Error::Runtime(e.to_string()))?;
        Ok(Self::with_handle(interval, handle))
    }

    pub fn with_handle(interval: Duration, handle: Handle) -> Self {
        Self {
            interval,
            generation: Arc::new(AtomicU64::new(0)),
            handle,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn schedule<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let interval = self.interval;
        self.handle.spawn(async move {
            tokio::time::sleep(interval).await;
            if generation.load(Ordering::SeqCst) == ticket {
                action();
            }
        });
    }

    /// Drop whatever is pending
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
