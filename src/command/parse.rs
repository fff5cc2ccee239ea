use crate::units::{Unit, UnitTable};
use std::fmt;
use std::sync::Arc;

/// Reasons a command is refused
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    NotAParticipant,
    InvalidInterval(String),
    UnknownUnit(String),
    TooManyArguments(usize),
    EntityUnavailable,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NotAParticipant => write!(f, "Only an active participant may use this."),
            CommandError::InvalidInterval(_) => write!(f, "Invalid delta."),
            CommandError::UnknownUnit(_) => write!(f, "Invalid unit."),
            CommandError::TooManyArguments(_) => write!(f, "Too many arguments."),
            CommandError::EntityUnavailable => write!(f, "Entity is not available."),
        }
    }
}

impl std::error::Error for CommandError {}

/// A validated start request.
#[derive(Debug, Clone, PartialEq)]
pub struct StartRequest {
    pub interval_seconds: u32,
    pub unit: Arc<Unit>,
}

/// Validate `[interval] [unit]` arguments.
///
/// The interval is a positive whole number of seconds and defaults to
/// `default_interval_seconds`; the unit defaults to the base unit.
pub fn parse_request(
    args: &[&str],
    units: &UnitTable,
    default_interval_seconds: u32,
) -> Result<StartRequest, CommandError> {
    if args.len() > 2 {
        return Err(CommandError::TooManyArguments(args.len()));
    }

    let interval_seconds = match args.first() {
        Some(raw) => match raw.parse::<u32>() {
            Ok(seconds) if seconds > 0 => seconds,
            _ => return Err(CommandError::InvalidInterval(raw.to_string())),
        },
        None => default_interval_seconds,
    };

    let unit = match args.get(1) {
        Some(name) => units
            .lookup(name)
            .ok_or_else(|| CommandError::UnknownUnit(name.to_string()))?,
        None => units.base(),
    };

    Ok(StartRequest {
        interval_seconds,
        unit,
    })
}
