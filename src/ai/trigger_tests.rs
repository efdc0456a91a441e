use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use super::*;
use crate::ai::client::FailureKind;

/// Records deliveries instead of touching a terminal
#[derive(Debug, Default)]
struct RecordingSurface {
    inline: Vec<(Position, String)>,
    panel: Vec<String>,
}

impl SuggestionSurface for RecordingSurface {
    fn insert_at(&mut self, position: Position, text: &str) {
        self.inline.push((position, text.to_string()));
    }

    fn show_in_panel(&mut self, text: &str) {
        self.panel.push(text.to_string());
    }
}

fn connected_controller(
    mode: SuggestionMode,
    debounce_ms: u64,
) -> (
    TriggerController,
    mpsc::Receiver<FetchRequest>,
    mpsc::Sender<FetchResponse>,
) {
    let mut controller = TriggerController::new(mode, debounce_ms);
    let (request_tx, request_rx) = mpsc::channel();
    let (response_tx, response_rx) = mpsc::channel();
    controller.set_channels(request_tx, response_rx);
    (controller, request_rx, response_tx)
}

fn pos(row: usize, col: usize) -> Position {
    Position { row, col }
}

// =========================================================================
// Mode behavior
// =========================================================================

#[test]
fn test_automatic_content_change_schedules_debounce() {
    let mut controller = TriggerController::new(SuggestionMode::Automatic, 20);
    controller.on_content_changed();
    assert!(!controller.debounce_ready());

    thread::sleep(Duration::from_millis(30));
    assert!(controller.debounce_ready());
}

#[test]
fn test_manual_mode_ignores_content_changes() {
    let mut controller = TriggerController::new(SuggestionMode::Manual, 10);
    controller.on_content_changed();

    thread::sleep(Duration::from_millis(20));
    assert!(!controller.debounce_ready());
}

#[test]
fn test_switch_to_manual_drops_pending_timer() {
    let mut controller = TriggerController::new(SuggestionMode::Automatic, 10);
    controller.on_content_changed();

    controller.set_mode(SuggestionMode::Manual);
    thread::sleep(Duration::from_millis(20));
    assert!(!controller.debounce_ready());
}

#[test]
fn test_switch_to_manual_leaves_in_flight_alone() {
    let (mut controller, _request_rx, _response_tx) =
        connected_controller(SuggestionMode::Automatic, 10);
    assert!(controller.start_fetch("p".to_string(), pos(0, 0)));

    controller.set_mode(SuggestionMode::Manual);
    assert!(controller.has_in_flight());
}

#[test]
fn test_mode_toggles() {
    assert_eq!(SuggestionMode::Automatic.toggled(), SuggestionMode::Manual);
    assert_eq!(SuggestionMode::Manual.toggled(), SuggestionMode::Automatic);
}

// =========================================================================
// Debounce collapsing
// =========================================================================

#[test]
fn test_burst_of_changes_produces_one_fetch() {
    let (mut controller, request_rx, _response_tx) =
        connected_controller(SuggestionMode::Automatic, 20);

    for _ in 0..5 {
        controller.on_content_changed();
        thread::sleep(Duration::from_millis(3));
    }
    assert!(!controller.debounce_ready());

    thread::sleep(Duration::from_millis(30));
    assert!(controller.debounce_ready());

    // The app initiates exactly one fetch per expiry
    controller.start_fetch("final content".to_string(), pos(0, 0));
    assert!(!controller.debounce_ready());

    let first = request_rx.try_recv();
    assert!(matches!(
        first,
        Ok(FetchRequest::Fetch { ref prompt, .. }) if prompt == "final content"
    ));
    assert!(request_rx.try_recv().is_err(), "only one fetch expected");
}

// =========================================================================
// Fetch lifecycle
// =========================================================================

#[test]
fn test_start_fetch_without_channel_fails() {
    let mut controller = TriggerController::new(SuggestionMode::Manual, 10);
    assert!(!controller.start_fetch("p".to_string(), pos(0, 0)));
    assert!(!controller.has_in_flight());
}

#[test]
fn test_request_ids_increase() {
    let (mut controller, request_rx, _response_tx) =
        connected_controller(SuggestionMode::Manual, 10);

    controller.start_fetch("a".to_string(), pos(0, 0));
    controller.start_fetch("b".to_string(), pos(0, 0));

    let ids: Vec<u64> = (0..2)
        .map(|_| match request_rx.try_recv().unwrap() {
            FetchRequest::Fetch { request_id, .. } => request_id,
        })
        .collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(controller.current_request_id(), 2);
}

#[test]
fn test_new_fetch_cancels_prior_token() {
    let (mut controller, request_rx, _response_tx) =
        connected_controller(SuggestionMode::Manual, 10);

    controller.start_fetch("a".to_string(), pos(0, 0));
    let FetchRequest::Fetch {
        cancel_token: first_token,
        ..
    } = request_rx.try_recv().unwrap();
    assert!(!first_token.is_cancelled());

    controller.start_fetch("b".to_string(), pos(0, 0));
    assert!(first_token.is_cancelled());
}

#[test]
fn test_content_change_cancels_in_flight() {
    let (mut controller, request_rx, _response_tx) =
        connected_controller(SuggestionMode::Automatic, 10);

    controller.start_fetch("a".to_string(), pos(0, 0));
    let FetchRequest::Fetch { cancel_token, .. } = request_rx.try_recv().unwrap();

    controller.on_content_changed();
    assert!(cancel_token.is_cancelled());
    assert!(!controller.has_in_flight());
}

// =========================================================================
// Delivery and the stale guard
// =========================================================================

#[test]
fn test_success_delivers_inline_at_captured_position() {
    let (mut controller, _request_rx, _response_tx) =
        connected_controller(SuggestionMode::Manual, 10);
    let mut surface = RecordingSurface::default();

    controller.start_fetch("p".to_string(), pos(3, 7));
    controller.handle_response(
        FetchResponse::Completed {
            request_id: 1,
            result: SuggestionResult::Success("suggested".to_string()),
        },
        &mut surface,
        true,
    );

    assert_eq!(surface.inline, vec![(pos(3, 7), "suggested".to_string())]);
    assert!(surface.panel.is_empty());
    assert!(!controller.has_in_flight());
}

#[test]
fn test_success_delivers_to_panel_when_inline_disabled() {
    let (mut controller, _request_rx, _response_tx) =
        connected_controller(SuggestionMode::Manual, 10);
    let mut surface = RecordingSurface::default();

    controller.start_fetch("p".to_string(), pos(0, 0));
    controller.handle_response(
        FetchResponse::Completed {
            request_id: 1,
            result: SuggestionResult::Success("suggested".to_string()),
        },
        &mut surface,
        false,
    );

    assert!(surface.inline.is_empty());
    assert_eq!(surface.panel, vec!["suggested".to_string()]);
}

#[test]
fn test_failure_goes_to_panel_even_with_inline_enabled() {
    let (mut controller, _request_rx, _response_tx) =
        connected_controller(SuggestionMode::Manual, 10);
    let mut surface = RecordingSurface::default();

    controller.start_fetch("p".to_string(), pos(0, 0));
    controller.handle_response(
        FetchResponse::Completed {
            request_id: 1,
            result: SuggestionResult::Failure {
                kind: FailureKind::Upstream,
                detail: "500 - boom".to_string(),
            },
        },
        &mut surface,
        true,
    );

    assert!(surface.inline.is_empty());
    assert_eq!(surface.panel, vec!["Error: 500 - boom".to_string()]);
}

#[test]
fn test_stale_result_is_discarded() {
    let (mut controller, _request_rx, _response_tx) =
        connected_controller(SuggestionMode::Manual, 10);
    let mut surface = RecordingSurface::default();

    controller.start_fetch("first".to_string(), pos(0, 0));
    controller.start_fetch("second".to_string(), pos(1, 0));

    // Request 1 completes after being superseded by request 2
    controller.handle_response(
        FetchResponse::Completed {
            request_id: 1,
            result: SuggestionResult::Success("stale".to_string()),
        },
        &mut surface,
        true,
    );
    assert!(surface.inline.is_empty());
    assert!(surface.panel.is_empty());
    assert!(controller.has_in_flight(), "request 2 is still outstanding");

    controller.handle_response(
        FetchResponse::Completed {
            request_id: 2,
            result: SuggestionResult::Success("fresh".to_string()),
        },
        &mut surface,
        true,
    );
    assert_eq!(surface.inline, vec![(pos(1, 0), "fresh".to_string())]);
}

#[test]
fn test_cancelled_response_clears_matching_in_flight() {
    let (mut controller, _request_rx, _response_tx) =
        connected_controller(SuggestionMode::Manual, 10);
    let mut surface = RecordingSurface::default();

    controller.start_fetch("p".to_string(), pos(0, 0));
    controller.handle_response(FetchResponse::Cancelled { request_id: 1 }, &mut surface, true);

    assert!(!controller.has_in_flight());
    assert!(surface.inline.is_empty());
    assert!(surface.panel.is_empty());
}

#[test]
fn test_worker_failure_lands_in_panel() {
    let (mut controller, _request_rx, _response_tx) =
        connected_controller(SuggestionMode::Manual, 10);
    let mut surface = RecordingSurface::default();

    controller.start_fetch("p".to_string(), pos(0, 0));
    controller.handle_response(
        FetchResponse::WorkerFailed("Error: suggestion worker crashed".to_string()),
        &mut surface,
        true,
    );

    assert!(!controller.has_in_flight());
    assert_eq!(surface.panel, vec!["Error: suggestion worker crashed".to_string()]);
}

#[test]
fn test_poll_responses_drains_channel() {
    let (mut controller, _request_rx, response_tx) =
        connected_controller(SuggestionMode::Manual, 10);
    let mut surface = RecordingSurface::default();

    controller.start_fetch("p".to_string(), pos(0, 0));
    response_tx
        .send(FetchResponse::Completed {
            request_id: 1,
            result: SuggestionResult::Success("via channel".to_string()),
        })
        .unwrap();

    assert!(controller.poll_responses(&mut surface, false));
    assert_eq!(surface.panel, vec!["via channel".to_string()]);

    // Nothing left
    assert!(!controller.poll_responses(&mut surface, false));
}
