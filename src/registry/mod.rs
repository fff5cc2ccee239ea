// Registry of running trackers, at most one per entity

use crate::clock::{CancelToken, SamplingClock};
use crate::host::Host;
use crate::reporter::ReporterKind;
use crate::tracker::Tracker;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};


/// A tracker shared between its scheduled tick and the control paths.
pub type SharedTracker = Arc<Mutex<Tracker>>;

/// Lock a shared tracker, recovering from a poisoned lock.
pub fn lock_tracker(tracker: &SharedTracker) -> MutexGuard<'_, Tracker> {
    tracker.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Snapshot of a running tracker.
#[derive(Debug, Clone, Serialize)]
pub struct TrackerStatus {
    pub entity_id: String,
    pub unit: String,
    pub interval_ticks: u32,
    pub reporter: ReporterKind,
    pub started_at: DateTime<Utc>,
}

struct TrackerEntry {
    tracker: SharedTracker,
    cancel: CancelToken,
    interval_ticks: u32,
    started_at: DateTime<Utc>,
}

impl TrackerEntry {
    /// Cancel the schedule first so no tick can see the released reporter.
    fn retire(mut self) {
        self.cancel.cancel();
        lock_tracker(&self.tracker).stop();
    }

    fn status(&self, entity_id: &str) -> TrackerStatus {
        let tracker = lock_tracker(&self.tracker);
        TrackerStatus {
            entity_id: entity_id.to_string(),
            unit: tracker.unit().name.clone(),
            interval_ticks: self.interval_ticks,
            reporter: tracker.reporter_kind(),
            started_at: self.started_at,
        }
    }
}

/// Maps entity id to its running tracker.
///
/// Created at system start and drained by [`TrackerRegistry::shutdown`].
pub struct TrackerRegistry {
    trackers: DashMap<String, TrackerEntry>,
}

impl TrackerRegistry {
    pub fn new() -> Self {
        Self {
            trackers: DashMap::new(),
        }
    }

    /// Schedule `tracker` every `interval_ticks` and register it.
    ///
    /// Any tracker still registered for the same entity is retired, never
    /// silently replaced.
    pub fn start(
        &self,
        tracker: Tracker,
        interval_ticks: u32,
        clock: &dyn SamplingClock,
        host: Arc<dyn Host>,
    ) -> SharedTracker {
        let entity_id = tracker.entity_id().to_string();
        let shared: SharedTracker = Arc::new(Mutex::new(tracker));

        let tick_tracker = Arc::clone(&shared);
        let tick_entity = entity_id.clone();
        let cancel = clock.schedule(
            interval_ticks,
            Box::new(move || {
                let Some(location) = host.location(&tick_entity) else {
                    debug!(entity_id = %tick_entity, "No position for entity, skipping tick");
                    return;
                };
                let now = host.now_millis();
                lock_tracker(&tick_tracker).tick(location, now);
            }),
        );

        let entry = TrackerEntry {
            tracker: Arc::clone(&shared),
            cancel,
            interval_ticks,
            started_at: Utc::now(),
        };

        if let Some(previous) = self.trackers.insert(entity_id.clone(), entry) {
            previous.retire();
            info!(entity_id = %entity_id, "Retired superseded tracker");
        }

        shared
    }

    /// Stop and remove the entity's tracker. Returns false if none was running.
    pub fn stop(&self, entity_id: &str) -> bool {
        match self.trackers.remove(entity_id) {
            Some((_, entry)) => {
                entry.retire();
                info!(entity_id = %entity_id, "Stopped meter");
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.trackers.contains_key(entity_id)
    }

    pub fn tracker(&self, entity_id: &str) -> Option<SharedTracker> {
        self.trackers.get(entity_id).map(|e| Arc::clone(&e.tracker))
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Status of every running tracker, sorted by entity id.
    pub fn statuses(&self) -> Vec<TrackerStatus> {
        let mut statuses: Vec<TrackerStatus> = self
            .trackers
            .iter()
            .map(|e| e.value().status(e.key()))
            .collect();
        statuses.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        statuses
    }

    /// Stop every tracker. Returns how many were running.
    pub fn shutdown(&self) -> usize {
        let entity_ids: Vec<String> = self.trackers.iter().map(|e| e.key().clone()).collect();
        entity_ids.iter().filter(|id| self.stop(id)).count()
    }
}

impl Default for TrackerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
