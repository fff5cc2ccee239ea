// Output sinks for a tracker's speed and status text

mod overlay;
mod text;

pub use overlay::OverlayReporter;
pub use text::TextReporter;

use serde::Serialize;
use std::fmt;

#[cfg(test)]
mod tests;

/// Sent when the entity's world differs from the previous sample.
pub const WORLD_CHANGE_MESSAGE: &str = "You changed the world. Wait one tick.";

/// Which rendering strategy a reporter uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReporterKind {
    Text,
    Overlay,
}

impl fmt::Display for ReporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReporterKind::Text => write!(f, "text"),
            ReporterKind::Overlay => write!(f, "overlay"),
        }
    }
}

/// Rendering capability a tracker reports through.
pub trait Reporter: Send {
    fn kind(&self) -> ReporterKind;

    /// Squared displacement below which a tick counts as standing still.
    fn min_move_delta_squared(&self) -> f64;

    /// Show a converted speed string such as `18.0 km/h`.
    fn report(&mut self, speed: &str);

    /// Signal that the last tick crossed into another world.
    fn report_world_changed(&mut self);

    /// Plain status notice (pause/resume) for the entity.
    fn notice(&mut self, text: &str);

    /// Free rendering-side resources. Safe to call more than once.
    fn release(&mut self);
}
