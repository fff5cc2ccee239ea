// End-to-end tracking flows through the public API
//
// The host is in-memory with manual time; the TickClock stands in for the
// host's 20 ticks/second scheduler.

use speedmeter::clock::{TickClock, TokioClock};
use speedmeter::config::SpeedMeterConfig;
use speedmeter::host::{Color, Location, MemoryHost};
use speedmeter::reporter::{ReporterKind, WORLD_CHANGE_MESSAGE};
use speedmeter::tracker::{PAUSED_MESSAGE, RESUMED_MESSAGE};
use speedmeter::{CommandController, CommandOutcome, CommandSender, UnitTable};
use std::sync::Arc;
use std::time::Duration;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn at(world: &str, x: f64) -> Location {
    Location::new(world, x, 64.0, 0.0)
}

fn setup(units: &str) -> (Arc<MemoryHost>, Arc<TickClock>, CommandController) {
    let host = Arc::new(MemoryHost::new());
    let clock = Arc::new(TickClock::new());
    let controller = CommandController::new(
        host.clone(),
        clock.clone(),
        UnitTable::parse(units),
        &SpeedMeterConfig::default(),
    );
    (host, clock, controller)
}

fn sender(id: &str) -> CommandSender {
    CommandSender::Entity(id.to_string())
}

/// Move the entity, advance host time by one interval and run the ticks.
fn step(host: &MemoryHost, clock: &TickClock, id: &str, to: Location, seconds: u64) {
    host.move_to(id, to);
    host.advance_time(seconds as i64 * 1000);
    clock.advance(seconds * 20);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// Walking, stopping and walking again yields reports and one notice per edge.
#[test]
fn test_text_session_with_pause_and_resume() {
    let (host, clock, controller) = setup("");
    host.connect("alice", at("world", 0.0), false);
    controller.handle(&sender("alice"), &[]);
    host.take_messages("alice");

    step(&host, &clock, "alice", at("world", 2.0), 1);
    step(&host, &clock, "alice", at("world", 2.0), 1);
    step(&host, &clock, "alice", at("world", 2.001), 1);
    step(&host, &clock, "alice", at("world", 2.001), 1);
    // 6 meters over the 4 seconds since the last report
    step(&host, &clock, "alice", at("world", 8.001), 1);

    assert_eq!(
        host.messages("alice"),
        vec![
            "Your average speed was: 2.0 m/s".to_string(),
            PAUSED_MESSAGE.to_string(),
            RESUMED_MESSAGE.to_string(),
            "Your average speed was: 1.5 m/s".to_string(),
        ]
    );
}

/// Crossing worlds produces the world-change report and no speed spike.
#[test]
fn test_world_change_report() {
    let (host, clock, controller) = setup("km/h 0.277778");
    host.connect("alice", at("world", 0.0), false);
    controller.handle(&sender("alice"), &["1", "km/h"]);
    host.take_messages("alice");

    step(&host, &clock, "alice", at("nether", 500.0), 1);
    step(&host, &clock, "alice", at("nether", 510.0), 1);

    assert_eq!(
        host.messages("alice"),
        vec![
            WORLD_CHANGE_MESSAGE.to_string(),
            // 10 m over 2 s since the tracker started
            "Your average speed was: 18.0 km/h".to_string(),
        ]
    );
}

/// Overlay clients get a live label that disappears when they leave.
#[test]
fn test_overlay_session_and_disconnect() {
    let (host, clock, controller) = setup("");
    host.connect("bob", at("world", 0.0), true);

    let outcome = controller.handle(&sender("bob"), &[]);
    assert!(matches!(
        outcome,
        CommandOutcome::Started {
            reporter: ReporterKind::Overlay,
            ..
        }
    ));

    step(&host, &clock, "bob", at("world", 0.0), 1);
    let label = host.labels("bob").pop().unwrap();
    assert_eq!(label.text, "Speed: 0.0 m/s");
    assert_eq!(label.color, Color::WHITE);
    assert_eq!((label.x, label.y), (3, 3));

    step(&host, &clock, "bob", at("end", 0.0), 1);
    let label = host.labels("bob").pop().unwrap();
    assert_eq!(label.text, WORLD_CHANGE_MESSAGE);
    assert_eq!(label.color, Color::RED);

    assert!(controller.disconnect("bob"));
    assert!(host.labels("bob").is_empty());
    assert_eq!(clock.active_tasks(), 0);
    assert_eq!(host.messages("bob"), vec!["SpeedMeter is now enabled!".to_string()]);
}

/// Restarting never leaves two trackers for one entity.
#[test]
fn test_at_most_one_tracker_per_entity() {
    let (host, clock, controller) = setup("mph 0.44704");
    host.connect("alice", at("world", 0.0), false);

    for args in [&[][..], &["5"][..], &["2", "mph"][..], &["1"][..]] {
        controller.handle(&sender("alice"), args);
        assert!(controller.registry().len() <= 1);
        assert!(clock.active_tasks() <= 1);
    }
    assert_eq!(controller.registry().len(), 1);
    assert_eq!(controller.registry().statuses()[0].interval_ticks, 20);
}

/// A missing unit file leaves only the base unit.
#[test]
fn test_missing_unit_file() {
    let dir = tempfile::tempdir().unwrap();
    let table = UnitTable::load_file(&dir.path().join("units")).unwrap();
    assert!(table.lookup("m/s").is_some());
    assert!(table.lookup("anything-else").is_none());
}

/// The tokio clock drives real sampling and shutdown cancels it.
#[tokio::test(start_paused = true)]
async fn test_tokio_clock_session() {
    let host = Arc::new(MemoryHost::new());
    let clock = Arc::new(TokioClock::current());
    let controller = CommandController::new(
        host.clone(),
        clock,
        UnitTable::new(),
        &SpeedMeterConfig::default(),
    );

    host.connect("alice", at("world", 0.0), false);
    controller.handle(&sender("alice"), &["2"]);
    host.take_messages("alice");

    host.move_to("alice", at("world", 8.0));
    host.advance_time(2000);
    tokio::time::sleep(Duration::from_millis(2100)).await;

    assert_eq!(
        host.messages("alice"),
        vec!["Your average speed was: 4.0 m/s".to_string()]
    );

    assert_eq!(controller.shutdown(), 1);
    host.move_to("alice", at("world", 100.0));
    host.advance_time(2000);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(host.messages("alice").len(), 1);
}
