// Unit table and speed formatting
pub mod units;

// Repeating-callback schedulers
pub mod clock;

// Host environment seam
pub mod host;

// Text and overlay output sinks
pub mod reporter;

// Per-entity sampling state machine
pub mod tracker;

// Running trackers, one per entity
pub mod registry;

// Start/stop command handling
pub mod command;

// TOML configuration
pub mod config;

pub use command::{CommandController, CommandError, CommandOutcome, CommandSender};
pub use registry::{TrackerRegistry, TrackerStatus};
pub use tracker::{TickOutcome, Tracker};
pub use units::{Unit, UnitTable};
