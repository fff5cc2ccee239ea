// Speed units and conversion from the base unit (meters per second)

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[cfg(test)]
mod tests;

/// Name of the base unit every factor is relative to.
pub const BASE_UNIT: &str = "m/s";

/// A named speed unit.
///
/// `factor` is how many meters per second one of this unit is worth, so a
/// speed in m/s is divided by the factor to get the value in this unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub name: String,
    pub factor: f64,
}

impl Unit {
    pub fn new(name: impl Into<String>, factor: f64) -> Self {
        Self {
            name: name.into(),
            factor,
        }
    }

    /// The base unit, m/s with factor 1.
    pub fn base() -> Self {
        Self::new(BASE_UNIT, 1.0)
    }

    /// Convert a speed in m/s into a display string like `18.0 km/h`.
    pub fn convert(&self, meters_per_second: f64) -> String {
        format!(
            "{} {}",
            format_decimal(round_to_decimals(meters_per_second / self.factor, 2)),
            self.name
        )
    }
}

/// Mapping from unit name to conversion factor.
///
/// Always contains the base unit. Names are case-sensitive.
#[derive(Debug, Clone)]
pub struct UnitTable {
    units: HashMap<String, Arc<Unit>>,
}

impl UnitTable {
    /// Table holding only the base unit.
    pub fn new() -> Self {
        let mut units = HashMap::new();
        units.insert(BASE_UNIT.to_string(), Arc::new(Unit::base()));
        Self { units }
    }

    /// Parse a unit table from text.
    ///
    /// Each line is `<name> <factor>`; `#` starts a comment. Lines that do not
    /// carry a name and a positive factor are skipped without error. A line
    /// may redefine the base unit.
    pub fn parse(source: &str) -> Self {
        let mut table = Self::new();

        for line in source.lines() {
            let data = match line.find('#') {
                Some(idx) => &line[..idx],
                None => line,
            };

            let mut tokens = data.split_whitespace();
            let (Some(name), Some(factor)) = (tokens.next(), tokens.next()) else {
                continue;
            };

            match factor.parse::<f64>() {
                Ok(factor) if factor > 0.0 && factor.is_finite() => {
                    table
                        .units
                        .insert(name.to_string(), Arc::new(Unit::new(name, factor)));
                }
                _ => {}
            }
        }

        table
    }

    /// Load a unit table from a file.
    ///
    /// A missing file is not an error: the table falls back to the base unit
    /// and the absence is logged. Other read failures are returned.
    pub fn load_file(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let table = Self::parse(&contents);
                info!(
                    path = %path.display(),
                    units = table.len(),
                    "Loaded unit table"
                );
                Ok(table)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "Unit file not found, using base unit only");
                Ok(Self::new())
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read unit file {}", path.display())),
        }
    }

    /// Look up a unit by exact name.
    pub fn lookup(&self, name: &str) -> Option<Arc<Unit>> {
        self.units.get(name).cloned()
    }

    /// The base unit entry (possibly redefined by the source).
    pub fn base(&self) -> Arc<Unit> {
        self.units
            .get(BASE_UNIT)
            .cloned()
            .unwrap_or_else(|| Arc::new(Unit::base()))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Unit names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.units.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for UnitTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Round to `decimals` places, halves away from zero.
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Format a rounded value; whole numbers keep one decimal place (`18.0`).
fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
