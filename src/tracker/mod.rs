// Per-entity speed sampling state machine

use crate::host::Location;
use crate::reporter::{Reporter, ReporterKind};
use crate::units::Unit;
use std::sync::Arc;
use tracing::debug;


pub const PAUSED_MESSAGE: &str = "Pause reporting. Will start if you are moving more.";
pub const RESUMED_MESSAGE: &str = "Stopped reporting pause.";

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Speed computed and reported (m/s). `resumed` is set on the tick that
    /// ended a pause.
    Reported { speed: f64, resumed: bool },
    /// Movement fell below the threshold; the pause notice was just sent.
    Paused,
    /// Still below the threshold; nothing sent.
    Idle,
    /// The entity is in a different world than at the previous tick.
    WorldChanged,
    /// The tracker was stopped; the tick was ignored.
    Stopped,
}

/// Samples one entity's position and reports its average speed.
///
/// Only `tick` and `stop` mutate a tracker.
pub struct Tracker {
    entity_id: String,
    unit: Arc<Unit>,
    min_move_delta_squared: f64,
    last_location: Location,
    last_sample_millis: i64,
    active: bool,
    stopped: bool,
    reporter: Box<dyn Reporter>,
}

impl Tracker {
    /// Create a tracker starting from `location` at `now_millis`.
    ///
    /// The movement threshold comes from the reporter variant.
    pub fn new(
        entity_id: impl Into<String>,
        unit: Arc<Unit>,
        location: Location,
        now_millis: i64,
        reporter: Box<dyn Reporter>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            unit,
            min_move_delta_squared: reporter.min_move_delta_squared(),
            last_location: location,
            last_sample_millis: now_millis,
            active: true,
            stopped: false,
            reporter,
        }
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn reporter_kind(&self) -> ReporterKind {
        self.reporter.kind()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn last_sample_millis(&self) -> i64 {
        self.last_sample_millis
    }

    pub fn last_location(&self) -> &Location {
        &self.last_location
    }

    /// Take one sample.
    ///
    /// The sample timestamp only advances when a speed is reported, so time
    /// spent paused or crossing worlds is folded into the next report.
    pub fn tick(&mut self, location: Location, now_millis: i64) -> TickOutcome {
        if self.stopped {
            return TickOutcome::Stopped;
        }

        let outcome = if !location.same_world(&self.last_location) {
            self.reporter.report_world_changed();
            TickOutcome::WorldChanged
        } else {
            let distance_squared = location.distance_squared(&self.last_location);

            if distance_squared < self.min_move_delta_squared {
                if self.active {
                    self.active = false;
                    self.reporter.notice(PAUSED_MESSAGE);
                    TickOutcome::Paused
                } else {
                    TickOutcome::Idle
                }
            } else {
                let resumed = !self.active;
                if resumed {
                    self.active = true;
                    self.reporter.notice(RESUMED_MESSAGE);
                }

                let elapsed = (now_millis - self.last_sample_millis).max(1);
                let speed = distance_squared.sqrt() / elapsed as f64 * 1000.0;
                self.reporter.report(&self.unit.convert(speed));
                self.last_sample_millis = now_millis;

                TickOutcome::Reported { speed, resumed }
            }
        };

        debug!(entity_id = %self.entity_id, outcome = ?outcome, "Tracker tick");
        self.last_location = location;
        outcome
    }

    /// Stop the tracker and release the reporter. Idempotent.
    ///
    /// Returns false if it was already stopped.
    pub fn stop(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        self.stopped = true;
        self.reporter.release();
        true
    }
}
