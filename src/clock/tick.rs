use super::{CancelToken, SamplingClock, TickCallback};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

struct ScheduledTask {
    interval_ticks: u64,
    next_due: u64,
    cancelled: Arc<AtomicBool>,
    callback: TickCallback,
}

/// Host-driven clock: the host calls [`TickClock::advance`] once per game
/// tick and every due callback runs synchronously on the caller's thread.
pub struct TickClock {
    now: AtomicU64,
    tasks: Mutex<Vec<ScheduledTask>>,
    /// Tasks scheduled while `advance` holds `tasks` (e.g. from a callback).
    pending: Mutex<Vec<ScheduledTask>>,
}

impl TickClock {
    pub fn new() -> Self {
        Self {
            now: AtomicU64::new(0),
            tasks: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Current tick count.
    pub fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    /// Number of scheduled callbacks that have not been cancelled.
    pub fn active_tasks(&self) -> usize {
        let tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        tasks
            .iter()
            .chain(pending.iter())
            .filter(|t| !t.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Advance the clock by `ticks`, running callbacks as they fall due.
    pub fn advance(&self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    fn step(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.now.fetch_add(1, Ordering::SeqCst) + 1;

        tasks.append(&mut self.pending.lock().unwrap_or_else(PoisonError::into_inner));
        tasks.retain(|t| !t.cancelled.load(Ordering::SeqCst));

        for task in tasks.iter_mut() {
            // A callback earlier in this step may have cancelled this one
            if task.next_due <= now && !task.cancelled.load(Ordering::SeqCst) {
                (task.callback)();
                task.next_due = now + task.interval_ticks;
            }
        }
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplingClock for TickClock {
    fn schedule(&self, interval_ticks: u32, callback: TickCallback) -> CancelToken {
        let interval_ticks = u64::from(interval_ticks.max(1));
        let cancelled = Arc::new(AtomicBool::new(false));

        let task = ScheduledTask {
            interval_ticks,
            next_due: self.now() + interval_ticks,
            cancelled: Arc::clone(&cancelled),
            callback,
        };

        match self.tasks.try_lock() {
            Ok(mut tasks) => tasks.push(task),
            Err(_) => self
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(task),
        }

        CancelToken::from_flag(cancelled)
    }
}
