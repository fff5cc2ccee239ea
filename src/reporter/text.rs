use super::{Reporter, ReporterKind, WORLD_CHANGE_MESSAGE};
use crate::host::Host;
use std::sync::Arc;

/// Sends every report as a standalone message to the entity.
pub struct TextReporter {
    host: Arc<dyn Host>,
    entity_id: String,
    min_move_delta_squared: f64,
}

impl TextReporter {
    /// `min_move_delta` is in meters; ticks moving less are treated as a pause.
    pub fn new(host: Arc<dyn Host>, entity_id: impl Into<String>, min_move_delta: f64) -> Self {
        Self {
            host,
            entity_id: entity_id.into(),
            min_move_delta_squared: min_move_delta * min_move_delta,
        }
    }
}

impl Reporter for TextReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::Text
    }

    fn min_move_delta_squared(&self) -> f64 {
        self.min_move_delta_squared
    }

    fn report(&mut self, speed: &str) {
        self.host.send_message(
            &self.entity_id,
            &format!("Your average speed was: {}", speed),
        );
    }

    fn report_world_changed(&mut self) {
        self.host.send_message(&self.entity_id, WORLD_CHANGE_MESSAGE);
    }

    fn notice(&mut self, text: &str) {
        self.host.send_message(&self.entity_id, text);
    }

    fn release(&mut self) {}
}
