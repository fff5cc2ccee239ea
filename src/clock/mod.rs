// Periodic sampling schedulers
//
// A SamplingClock invokes a callback every N ticks until the returned
// CancelToken is cancelled. Intervals are expressed in host ticks
// (TICKS_PER_SECOND per second).

mod tick;
mod tokio_clock;

pub use tick::TickClock;
pub use tokio_clock::TokioClock;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;


/// Host ticks per second.
pub const TICKS_PER_SECOND: u32 = 20;

/// Callback run on every scheduled tick.
pub type TickCallback = Box<dyn FnMut() + Send + 'static>;

/// Repeating-callback facility.
pub trait SamplingClock: Send + Sync {
    /// Run `callback` every `interval_ticks` ticks, first after one full
    /// interval, until the token is cancelled.
    fn schedule(&self, interval_ticks: u32, callback: TickCallback) -> CancelToken;
}

/// Handle for cancelling a scheduled callback.
///
/// Cancelling is idempotent. Dropping the token does not cancel.
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl CancelToken {
    /// Token backed only by a shared flag the scheduler polls.
    pub fn from_flag(cancelled: Arc<AtomicBool>) -> Self {
        Self {
            cancelled,
            on_cancel: None,
        }
    }

    /// Token that also runs `on_cancel` the first time it is cancelled.
    pub fn with_hook(cancelled: Arc<AtomicBool>, on_cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancelled,
            on_cancel: Some(Box::new(on_cancel)),
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(hook) = self.on_cancel.take() {
            hook();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Convert a whole number of seconds into host ticks, `None` if it does not fit.
pub fn seconds_to_ticks(seconds: u32, ticks_per_second: u32) -> Option<u32> {
    seconds.checked_mul(ticks_per_second)
}
