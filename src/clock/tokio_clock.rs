use super::{CancelToken, SamplingClock, TickCallback, TICKS_PER_SECOND};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Wall-clock sampling clock: one tokio task per scheduled callback.
///
/// Cancelling the token aborts the task; the shared flag is also checked
/// before every callback so a tick racing the abort does not run.
pub struct TokioClock {
    runtime: Handle,
    ticks_per_second: u32,
}

impl TokioClock {
    /// Clock bound to the given runtime, `ticks_per_second` host ticks per second.
    pub fn new(runtime: Handle, ticks_per_second: u32) -> Self {
        Self {
            runtime,
            ticks_per_second: ticks_per_second.max(1),
        }
    }

    /// Clock bound to the current runtime at the default tick rate.
    ///
    /// Panics outside a tokio runtime, like `tokio::spawn`.
    pub fn current() -> Self {
        Self::new(Handle::current(), TICKS_PER_SECOND)
    }

    /// Wall-clock length of `interval_ticks`, never shorter than 1 ms.
    pub fn period(&self, interval_ticks: u32) -> Duration {
        let nanos = u64::from(interval_ticks.max(1)) * 1_000_000_000
            / u64::from(self.ticks_per_second);
        Duration::from_nanos(nanos).max(MIN_PERIOD)
    }
}

impl SamplingClock for TokioClock {
    fn schedule(&self, interval_ticks: u32, mut callback: TickCallback) -> CancelToken {
        let period = self.period(interval_ticks);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = self.runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);

            // Drift is absorbed by the tracker's own timestamps
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if flag.load(Ordering::SeqCst) {
                    debug!("Sampling task cancelled");
                    break;
                }
                callback();
            }
        });

        let abort = handle.abort_handle();
        CancelToken::with_hook(cancelled, move || abort.abort())
    }
}
