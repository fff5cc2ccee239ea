use anyhow::{bail, Context, Result};
use speedmeter::clock::TokioClock;
use speedmeter::config::{load_config, SpeedMeterConfig};
use speedmeter::host::{Color, Host, Location, MemoryHost, WidgetId};
use speedmeter::{CommandController, CommandSender, UnitTable};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tracing::{info, warn};

/// In-memory host that echoes everything shown to entities on stdout.
struct ConsoleHost {
    inner: MemoryHost,
}

impl Host for ConsoleHost {
    fn location(&self, entity_id: &str) -> Option<Location> {
        self.inner.location(entity_id)
    }

    fn send_message(&self, entity_id: &str, message: &str) {
        println!("[{}] {}", entity_id, message);
        self.inner.send_message(entity_id, message);
    }

    fn now_millis(&self) -> i64 {
        self.inner.now_millis()
    }

    fn supports_overlay(&self, entity_id: &str) -> bool {
        self.inner.supports_overlay(entity_id)
    }

    fn attach_label(&self, entity_id: &str, x: i32, y: i32) -> Result<WidgetId> {
        self.inner.attach_label(entity_id, x, y)
    }

    fn update_label(&self, entity_id: &str, widget: WidgetId, text: &str, color: Color) -> Result<()> {
        let marker = if color == Color::RED { "!" } else { "" };
        println!("[{} overlay #{}]{} {}", entity_id, widget, marker, text);
        self.inner.update_label(entity_id, widget, text, color)
    }

    fn remove_label(&self, entity_id: &str, widget: WidgetId) -> Result<()> {
        self.inner.remove_label(entity_id, widget)
    }
}

fn parse_location(args: &[&str]) -> Result<Location> {
    let [world, x, y, z] = args else {
        bail!("expected <world> <x> <y> <z>");
    };
    Ok(Location::new(
        *world,
        x.parse().context("x must be a number")?,
        y.parse().context("y must be a number")?,
        z.parse().context("z must be a number")?,
    ))
}

fn run_line(
    line: &str,
    host: &ConsoleHost,
    controller: &CommandController,
    units_path: &Path,
) -> Result<bool> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = tokens.split_first() else {
        return Ok(true);
    };

    match verb {
        "join" => {
            let Some((&id, rest)) = args.split_first() else {
                bail!("usage: join <id> <world> <x> <y> <z> [overlay]");
            };
            let overlay = rest.last() == Some(&"overlay");
            let coords = if overlay { &rest[..rest.len() - 1] } else { rest };
            host.inner.connect(id, parse_location(coords)?, overlay);
        }
        "move" => {
            let Some((&id, rest)) = args.split_first() else {
                bail!("usage: move <id> <world> <x> <y> <z>");
            };
            if !host.inner.move_to(id, parse_location(rest)?) {
                bail!("unknown entity '{}'", id);
            }
        }
        "leave" => {
            let Some(&id) = args.first() else {
                bail!("usage: leave <id>");
            };
            controller.disconnect(id);
            host.inner.disconnect(id);
        }
        "speed" => {
            let Some((&id, rest)) = args.split_first() else {
                bail!("usage: speed <id> [interval] [unit]");
            };
            let outcome = controller.handle(&CommandSender::Entity(id.to_string()), rest);
            info!(entity_id = %id, outcome = ?outcome, "Command handled");
        }
        "console" => {
            let outcome = controller.handle(&CommandSender::Console, args);
            if let Some(message) = outcome.rejection_message() {
                println!("{}", message);
            }
        }
        "units" => println!("{}", controller.unit_names().join(", ")),
        "reload" => {
            let count = controller.reload_units(units_path)?;
            println!("{} units loaded", count);
        }
        "status" => {
            let statuses = controller.registry().statuses();
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
        "quit" => return Ok(false),
        other => bail!("unknown command '{}'", other),
    }

    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "speedmeter=info".into()),
        )
        .init();

    info!("SpeedMeter starting...");

    let config = match std::env::var("SPEEDMETER_CONFIG") {
        Ok(path) => load_config(&PathBuf::from(path))?,
        Err(_) => SpeedMeterConfig::default(),
    }
    .with_env_overrides();

    let units = UnitTable::load_file(&config.units.path)?;

    let host = Arc::new(ConsoleHost {
        inner: MemoryHost::realtime(),
    });
    let clock = Arc::new(TokioClock::new(
        Handle::current(),
        config.tracking.ticks_per_second,
    ));
    let controller = CommandController::new(host.clone(), clock, units, &config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                match run_line(&line, &host, &controller, &config.units.path) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => warn!(error = %e, "Command failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    controller.shutdown();
    Ok(())
}
