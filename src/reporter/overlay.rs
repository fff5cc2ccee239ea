use super::{Reporter, ReporterKind, WORLD_CHANGE_MESSAGE};
use crate::host::{Color, Host, WidgetId};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::warn;

/// Renders into a single on-screen label owned for the tracker's lifetime.
///
/// Every tick reports (zero movement threshold) so the label stays live.
pub struct OverlayReporter {
    host: Arc<dyn Host>,
    entity_id: String,
    widget: Option<WidgetId>,
}

impl OverlayReporter {
    /// Attach the label at (x, y) on the entity's screen.
    pub fn attach(host: Arc<dyn Host>, entity_id: impl Into<String>, x: i32, y: i32) -> Result<Self> {
        let entity_id = entity_id.into();
        let widget = host
            .attach_label(&entity_id, x, y)
            .with_context(|| format!("Failed to attach overlay label for '{}'", entity_id))?;

        Ok(Self {
            host,
            entity_id,
            widget: Some(widget),
        })
    }

    pub fn widget(&self) -> Option<WidgetId> {
        self.widget
    }

    fn show(&self, text: &str, color: Color) {
        let Some(widget) = self.widget else {
            return;
        };
        if let Err(e) = self.host.update_label(&self.entity_id, widget, text, color) {
            warn!(entity_id = %self.entity_id, widget, error = %e, "Failed to update overlay label");
        }
    }
}

impl Reporter for OverlayReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::Overlay
    }

    fn min_move_delta_squared(&self) -> f64 {
        0.0
    }

    fn report(&mut self, speed: &str) {
        self.show(&format!("Speed: {}", speed), Color::WHITE);
    }

    fn report_world_changed(&mut self) {
        self.show(WORLD_CHANGE_MESSAGE, Color::RED);
    }

    fn notice(&mut self, text: &str) {
        self.host.send_message(&self.entity_id, text);
    }

    fn release(&mut self) {
        let Some(widget) = self.widget.take() else {
            return;
        };
        // Best effort: the entity may already be gone along with its screen
        if let Err(e) = self.host.remove_label(&self.entity_id, widget) {
            warn!(entity_id = %self.entity_id, widget, error = %e, "Failed to remove overlay label");
        }
    }
}
