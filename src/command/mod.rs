// Start/stop command handling and the tracker lifecycle around it

mod parse;

pub use parse::{parse_request, CommandError, StartRequest};

use crate::clock::{seconds_to_ticks, SamplingClock};
use crate::config::{OverlayConfig, SpeedMeterConfig, TrackingConfig};
use crate::host::Host;
use crate::registry::TrackerRegistry;
use crate::reporter::{OverlayReporter, Reporter, ReporterKind, TextReporter};
use crate::tracker::Tracker;
use crate::units::UnitTable;
use anyhow::Result;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};


pub const ENABLED_MESSAGE: &str = "SpeedMeter is now enabled!";
pub const STOPPED_MESSAGE: &str = "SpeedMeter is now stopped.";

/// Who issued a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSender {
    /// A tracked-capable participant, by entity id
    Entity(String),
    /// Operator console; has no position to track
    Console,
}

/// Result of handling one command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Started {
        interval_ticks: u32,
        unit: String,
        reporter: ReporterKind,
        /// A previous tracker for the entity was stopped first
        restarted: bool,
    },
    Stopped,
    Rejected(CommandError),
}

impl CommandOutcome {
    /// Text to show a sender that has no chat of its own, if any.
    pub fn rejection_message(&self) -> Option<String> {
        match self {
            CommandOutcome::Rejected(error) => Some(error.to_string()),
            _ => None,
        }
    }
}

/// Drives the registry from start/stop requests, disconnects and shutdown.
pub struct CommandController {
    registry: Arc<TrackerRegistry>,
    units: RwLock<UnitTable>,
    host: Arc<dyn Host>,
    clock: Arc<dyn SamplingClock>,
    tracking: TrackingConfig,
    overlay: OverlayConfig,
}

impl CommandController {
    pub fn new(
        host: Arc<dyn Host>,
        clock: Arc<dyn SamplingClock>,
        units: UnitTable,
        config: &SpeedMeterConfig,
    ) -> Self {
        info!(units = units.len(), "SpeedMeter enabled");
        Self {
            registry: Arc::new(TrackerRegistry::new()),
            units: RwLock::new(units),
            host,
            clock,
            tracking: config.tracking.clone(),
            overlay: config.overlay.clone(),
        }
    }

    pub fn registry(&self) -> &Arc<TrackerRegistry> {
        &self.registry
    }

    /// Sorted names of the currently loaded units.
    pub fn unit_names(&self) -> Vec<String> {
        self.units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .names()
    }

    /// Handle a start/stop command with its raw arguments.
    ///
    /// - no args while tracked: stop
    /// - args while tracked: validate, then stop and start again
    /// - not tracked: validate and start
    ///
    /// Invalid requests are answered with a message and change nothing.
    pub fn handle(&self, sender: &CommandSender, args: &[&str]) -> CommandOutcome {
        let entity_id = match sender {
            CommandSender::Entity(id) => id.as_str(),
            CommandSender::Console => {
                let error = CommandError::NotAParticipant;
                warn!(error = %error, "Rejected command from console");
                return CommandOutcome::Rejected(error);
            }
        };

        let tracked = self.registry.contains(entity_id);
        if tracked && args.is_empty() {
            self.stop_entity(entity_id);
            return CommandOutcome::Stopped;
        }

        let request = {
            let units = self.units.read().unwrap_or_else(PoisonError::into_inner);
            parse_request(args, &units, self.tracking.default_interval_seconds)
        };

        match request.and_then(|r| self.start_entity(entity_id, r, tracked)) {
            Ok(outcome) => outcome,
            Err(error) => {
                self.host.send_message(entity_id, &error.to_string());
                CommandOutcome::Rejected(error)
            }
        }
    }

    /// Stop the entity's tracker because it left. Returns false if untracked.
    pub fn disconnect(&self, entity_id: &str) -> bool {
        let stopped = self.registry.stop(entity_id);
        if stopped {
            info!(entity_id = %entity_id, "Entity disconnected, meter stopped");
        }
        stopped
    }

    /// Replace the unit table from `path`. Running trackers keep their unit.
    pub fn reload_units(&self, path: &Path) -> Result<usize> {
        let table = UnitTable::load_file(path)?;
        let count = table.len();
        *self.units.write().unwrap_or_else(PoisonError::into_inner) = table;
        Ok(count)
    }

    /// Cancel every running tracker. Returns how many were stopped.
    pub fn shutdown(&self) -> usize {
        let stopped = self.registry.shutdown();
        info!(stopped = stopped, "SpeedMeter disabled");
        stopped
    }

    fn stop_entity(&self, entity_id: &str) -> bool {
        let stopped = self.registry.stop(entity_id);
        if stopped {
            self.host.send_message(entity_id, STOPPED_MESSAGE);
        }
        stopped
    }

    fn start_entity(
        &self,
        entity_id: &str,
        request: StartRequest,
        tracked: bool,
    ) -> Result<CommandOutcome, CommandError> {
        let seconds = request.interval_seconds;
        let interval_ticks = seconds_to_ticks(seconds, self.tracking.ticks_per_second)
            .ok_or_else(|| CommandError::InvalidInterval(seconds.to_string()))?;
        let location = self
            .host
            .location(entity_id)
            .ok_or(CommandError::EntityUnavailable)?;

        if tracked {
            self.stop_entity(entity_id);
        }

        let reporter = self.select_reporter(entity_id);
        let reporter_kind = reporter.kind();
        let unit_name = request.unit.name.clone();

        let tracker = Tracker::new(
            entity_id,
            request.unit,
            location,
            self.host.now_millis(),
            reporter,
        );
        self.registry.start(
            tracker,
            interval_ticks,
            self.clock.as_ref(),
            Arc::clone(&self.host),
        );

        self.host.send_message(entity_id, ENABLED_MESSAGE);
        info!(
            entity_id = %entity_id,
            interval_ticks = interval_ticks,
            unit = %unit_name,
            reporter = %reporter_kind,
            "Started meter"
        );

        Ok(CommandOutcome::Started {
            interval_ticks,
            unit: unit_name,
            reporter: reporter_kind,
            restarted: tracked,
        })
    }

    /// Overlay when the client supports it, chat messages otherwise.
    fn select_reporter(&self, entity_id: &str) -> Box<dyn Reporter> {
        if self.host.supports_overlay(entity_id) {
            match OverlayReporter::attach(
                Arc::clone(&self.host),
                entity_id,
                self.overlay.x,
                self.overlay.y,
            ) {
                Ok(reporter) => return Box::new(reporter),
                Err(e) => {
                    warn!(entity_id = %entity_id, error = %e, "Falling back to text reporting");
                }
            }
        }
        Box::new(TextReporter::new(
            Arc::clone(&self.host),
            entity_id,
            self.tracking.min_move_delta,
        ))
    }
}
