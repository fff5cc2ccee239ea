use super::*;
use crate::host::{Color, Host, Location, MemoryHost};
use std::sync::Arc;

fn host_with(entity: &str, overlay: bool) -> Arc<MemoryHost> {
    let host = Arc::new(MemoryHost::new());
    host.connect(entity, Location::new("world", 0.0, 0.0, 0.0), overlay);
    host
}

#[test]
fn test_text_reporter_sends_messages() {
    let host = host_with("alice", false);
    let mut reporter = TextReporter::new(host.clone(), "alice", 0.01);

    assert_eq!(reporter.kind(), ReporterKind::Text);
    assert!((reporter.min_move_delta_squared() - 0.0001).abs() < 1e-12);

    reporter.report("18.0 km/h");
    reporter.report_world_changed();
    reporter.notice("Stopped reporting pause.");
    reporter.release();
    reporter.release();

    assert_eq!(
        host.messages("alice"),
        vec![
            "Your average speed was: 18.0 km/h".to_string(),
            WORLD_CHANGE_MESSAGE.to_string(),
            "Stopped reporting pause.".to_string(),
        ]
    );
}

#[test]
fn test_overlay_reporter_updates_label_in_place() {
    let host = host_with("alice", true);
    let mut reporter = OverlayReporter::attach(host.clone(), "alice", 3, 3).unwrap();

    assert_eq!(reporter.kind(), ReporterKind::Overlay);
    assert_eq!(reporter.min_move_delta_squared(), 0.0);

    reporter.report("5.0 m/s");
    let labels = host.labels("alice");
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].text, "Speed: 5.0 m/s");
    assert_eq!(labels[0].color, Color::WHITE);

    reporter.report_world_changed();
    let labels = host.labels("alice");
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].text, WORLD_CHANGE_MESSAGE);
    assert_eq!(labels[0].color, Color::RED);

    // Overlay reports never go to chat
    assert!(host.messages("alice").is_empty());
}

#[test]
fn test_overlay_release_removes_label_once() {
    let host = host_with("alice", true);
    let mut reporter = OverlayReporter::attach(host.clone(), "alice", 3, 3).unwrap();
    assert!(reporter.widget().is_some());

    reporter.release();
    assert!(host.labels("alice").is_empty());
    assert!(reporter.widget().is_none());

    reporter.release();
    reporter.report("1.0 m/s");
    assert!(host.labels("alice").is_empty());
}

#[test]
fn test_overlay_release_tolerates_missing_entity() {
    let host = host_with("alice", true);
    let mut reporter = OverlayReporter::attach(host.clone(), "alice", 3, 3).unwrap();

    host.disconnect("alice");
    reporter.release();
    assert!(reporter.widget().is_none());
}

#[test]
fn test_overlay_attach_fails_without_capability() {
    let host = host_with("bob", false);
    let result = OverlayReporter::attach(host.clone(), "bob", 3, 3);
    assert!(result.is_err());
    assert!(!host.supports_overlay("bob"));
}
