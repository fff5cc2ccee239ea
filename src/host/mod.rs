// Host environment seam: entity positions, messaging and overlay widgets

mod memory;

pub use memory::{Label, MemoryHost};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};


/// Position of an entity: world identity plus 3D coordinate (meters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// Squared distance to `other`, ignoring the world.
    pub fn distance_squared(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn same_world(&self, other: &Location) -> bool {
        self.world == other.world
    }
}

/// Identifier of an overlay widget, unique per host.
pub type WidgetId = u64;

/// RGB text color, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };
    pub const RED: Color = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };
}

/// The environment the tracking engine runs inside.
///
/// Implementations must be cheap to call from a scheduled tick: no blocking
/// I/O behind any of these methods.
pub trait Host: Send + Sync {
    /// Current location, or `None` if the entity is not present.
    fn location(&self, entity_id: &str) -> Option<Location>;

    /// Send a standalone text message to the entity.
    fn send_message(&self, entity_id: &str, message: &str);

    /// Monotonic milliseconds used for sample timestamps.
    fn now_millis(&self) -> i64;

    /// Whether the entity's client can render overlay widgets.
    ///
    /// Hosts that cannot answer must return `false`.
    fn supports_overlay(&self, _entity_id: &str) -> bool {
        false
    }

    /// Attach a text label to the entity's screen at (x, y).
    fn attach_label(&self, _entity_id: &str, _x: i32, _y: i32) -> Result<WidgetId> {
        bail!("overlay rendering is not available")
    }

    /// Replace a label's text and color.
    fn update_label(
        &self,
        _entity_id: &str,
        _widget: WidgetId,
        _text: &str,
        _color: Color,
    ) -> Result<()> {
        bail!("overlay rendering is not available")
    }

    /// Detach a label from the entity's screen.
    fn remove_label(&self, _entity_id: &str, _widget: WidgetId) -> Result<()> {
        bail!("overlay rendering is not available")
    }
}
