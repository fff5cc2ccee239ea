use super::{Color, Host, Location, WidgetId};
use anyhow::{anyhow, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Instant;
use tracing::debug;

/// A label attached to an entity's screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub x: i32,
    pub y: i32,
    pub text: String,
    pub color: Color,
}

struct EntityState {
    location: Location,
    overlay: bool,
    labels: HashMap<WidgetId, Label>,
}

enum HostTime {
    Manual(AtomicI64),
    Monotonic(Instant),
}

/// In-process host keeping entities, messages and labels in memory.
///
/// Time is either driven manually (`new`) or follows a monotonic clock
/// (`realtime`).
pub struct MemoryHost {
    entities: DashMap<String, EntityState>,
    messages: DashMap<String, Vec<String>>,
    next_widget: AtomicU64,
    time: HostTime,
}

impl MemoryHost {
    /// Host with manual time starting at 0 ms.
    pub fn new() -> Self {
        Self::with_time(HostTime::Manual(AtomicI64::new(0)))
    }

    /// Host whose time follows a monotonic clock.
    pub fn realtime() -> Self {
        Self::with_time(HostTime::Monotonic(Instant::now()))
    }

    fn with_time(time: HostTime) -> Self {
        Self {
            entities: DashMap::new(),
            messages: DashMap::new(),
            next_widget: AtomicU64::new(1),
            time,
        }
    }

    /// Add an entity (or replace it if already present).
    pub fn connect(&self, entity_id: &str, location: Location, overlay: bool) {
        self.entities.insert(
            entity_id.to_string(),
            EntityState {
                location,
                overlay,
                labels: HashMap::new(),
            },
        );
    }

    /// Remove an entity; its labels go with it.
    pub fn disconnect(&self, entity_id: &str) -> bool {
        self.entities.remove(entity_id).is_some()
    }

    pub fn is_connected(&self, entity_id: &str) -> bool {
        self.entities.contains_key(entity_id)
    }

    /// Move an entity. Returns false if it is not connected.
    pub fn move_to(&self, entity_id: &str, location: Location) -> bool {
        match self.entities.get_mut(entity_id) {
            Some(mut entity) => {
                entity.location = location;
                true
            }
            None => false,
        }
    }

    /// Set manual time. No effect on a realtime host.
    pub fn set_time(&self, millis: i64) {
        if let HostTime::Manual(now) = &self.time {
            now.store(millis, Ordering::SeqCst);
        }
    }

    /// Advance manual time. No effect on a realtime host.
    pub fn advance_time(&self, millis: i64) {
        if let HostTime::Manual(now) = &self.time {
            now.fetch_add(millis, Ordering::SeqCst);
        }
    }

    /// All messages sent to the entity so far.
    pub fn messages(&self, entity_id: &str) -> Vec<String> {
        self.messages
            .get(entity_id)
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Remove and return the entity's messages.
    pub fn take_messages(&self, entity_id: &str) -> Vec<String> {
        self.messages
            .remove(entity_id)
            .map(|(_, m)| m)
            .unwrap_or_default()
    }

    /// Labels currently attached to the entity's screen.
    pub fn labels(&self, entity_id: &str) -> Vec<Label> {
        self.entities
            .get(entity_id)
            .map(|e| e.labels.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MemoryHost {
    fn location(&self, entity_id: &str) -> Option<Location> {
        self.entities.get(entity_id).map(|e| e.location.clone())
    }

    fn send_message(&self, entity_id: &str, message: &str) {
        if !self.entities.contains_key(entity_id) {
            debug!(entity_id = %entity_id, "Dropping message for absent entity");
            return;
        }
        self.messages
            .entry(entity_id.to_string())
            .or_default()
            .push(message.to_string());
    }

    fn now_millis(&self) -> i64 {
        match &self.time {
            HostTime::Manual(now) => now.load(Ordering::SeqCst),
            HostTime::Monotonic(start) => start.elapsed().as_millis() as i64,
        }
    }

    fn supports_overlay(&self, entity_id: &str) -> bool {
        self.entities
            .get(entity_id)
            .map(|e| e.overlay)
            .unwrap_or(false)
    }

    fn attach_label(&self, entity_id: &str, x: i32, y: i32) -> Result<WidgetId> {
        let mut entity = self
            .entities
            .get_mut(entity_id)
            .ok_or_else(|| anyhow!("entity '{}' is not connected", entity_id))?;
        if !entity.overlay {
            return Err(anyhow!("entity '{}' cannot render overlays", entity_id));
        }

        let widget = self.next_widget.fetch_add(1, Ordering::SeqCst);
        entity.labels.insert(
            widget,
            Label {
                x,
                y,
                text: String::new(),
                color: Color::WHITE,
            },
        );
        Ok(widget)
    }

    fn update_label(&self, entity_id: &str, widget: WidgetId, text: &str, color: Color) -> Result<()> {
        let mut entity = self
            .entities
            .get_mut(entity_id)
            .ok_or_else(|| anyhow!("entity '{}' is not connected", entity_id))?;
        let label = entity
            .labels
            .get_mut(&widget)
            .ok_or_else(|| anyhow!("label {} is not attached", widget))?;
        label.text = text.to_string();
        label.color = color;
        Ok(())
    }

    fn remove_label(&self, entity_id: &str, widget: WidgetId) -> Result<()> {
        let mut entity = self
            .entities
            .get_mut(entity_id)
            .ok_or_else(|| anyhow!("entity '{}' is not connected", entity_id))?;
        entity
            .labels
            .remove(&widget)
            .map(|_| ())
            .ok_or_else(|| anyhow!("label {} is not attached", widget))
    }
}
