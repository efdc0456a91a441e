use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use super::*;
use crate::ai::client::SuggestionResult;
use crate::ai::{FetchRequest, FetchResponse};

fn test_config(debounce_ms: u64) -> Config {
    let mut config = Config::default();
    config.ai.debounce_ms = debounce_ms;
    config
}

fn connected_app(
    debounce_ms: u64,
) -> (
    App,
    mpsc::Receiver<FetchRequest>,
    mpsc::Sender<FetchResponse>,
) {
    let mut app = App::new(&test_config(debounce_ms), Settings::default(), None);
    let (request_tx, request_rx) = mpsc::channel();
    let (response_tx, response_rx) = mpsc::channel();
    app.trigger.set_channels(request_tx, response_rx);
    (app, request_rx, response_tx)
}

#[test]
fn test_new_app_defaults() {
    let app = App::new(&Config::default(), Settings::default(), None);
    assert!(!app.should_quit());
    assert!(app.should_render());
    assert_eq!(app.status(), "Ready");
    assert_eq!(app.suggestion_mode(), SuggestionMode::Automatic);
    assert!(app.panel.is_empty());
}

#[test]
fn test_request_without_worker_reports_unavailable() {
    let mut app = App::new(&Config::default(), Settings::default(), None);
    app.request_suggestion();
    assert_eq!(app.status(), "Suggestion worker unavailable");
    assert!(!app.trigger.has_in_flight());
}

#[test]
fn test_request_builds_prompt_from_code_and_language() {
    let (mut app, request_rx, _response_tx) = connected_app(1000);
    app.editor.input(ratatui::crossterm::event::KeyEvent::new(
        ratatui::crossterm::event::KeyCode::Char('x'),
        ratatui::crossterm::event::KeyModifiers::NONE,
    ));

    app.request_suggestion();
    assert_eq!(app.status(), "Fetching suggestion...");

    let FetchRequest::Fetch { prompt, .. } = request_rx.try_recv().unwrap();
    assert!(prompt.contains("Python code"));
    assert!(prompt.ends_with('x'));
}

#[test]
fn test_delivery_routes_to_panel_by_default() {
    let (mut app, _request_rx, response_tx) = connected_app(1000);

    app.request_suggestion();
    response_tx
        .send(FetchResponse::Completed {
            request_id: 1,
            result: SuggestionResult::Success("println!()".to_string()),
        })
        .unwrap();

    app.poll_suggestions();
    assert_eq!(app.panel.text(), "println!()");
    assert_eq!(app.editor.current_code(), "");
    assert_eq!(app.status(), "Suggestion updated.");
}

#[test]
fn test_delivery_routes_inline_when_enabled() {
    let (mut app, _request_rx, response_tx) = connected_app(1000);
    app.settings.inline_suggestions = true;

    app.request_suggestion();
    response_tx
        .send(FetchResponse::Completed {
            request_id: 1,
            result: SuggestionResult::Success("pass".to_string()),
        })
        .unwrap();

    app.poll_suggestions();
    assert_eq!(app.editor.current_code(), "pass");
    assert!(app.panel.is_empty());
}

#[test]
fn test_cycle_language_clears_panel_but_not_in_flight() {
    let (mut app, _request_rx, _response_tx) = connected_app(1000);

    app.panel.display("old suggestion");
    app.request_suggestion();
    assert!(app.trigger.has_in_flight());

    app.cycle_language();
    assert!(app.panel.is_empty());
    assert_eq!(app.editor.syntax_mode(), "JavaScript");
    assert!(app.trigger.has_in_flight(), "language change must not cancel");
}

#[test]
fn test_tick_fires_debounced_fetch_with_current_content() {
    let (mut app, request_rx, _response_tx) = connected_app(20);

    app.editor.input(ratatui::crossterm::event::KeyEvent::new(
        ratatui::crossterm::event::KeyCode::Char('a'),
        ratatui::crossterm::event::KeyModifiers::NONE,
    ));
    app.on_content_changed();

    // Quiet period not yet elapsed
    app.tick();
    assert!(request_rx.try_recv().is_err());

    thread::sleep(Duration::from_millis(30));
    app.tick();

    let FetchRequest::Fetch { prompt, .. } = request_rx.try_recv().unwrap();
    assert!(prompt.ends_with('a'));
    // Exactly one fetch per expiry
    assert!(request_rx.try_recv().is_err());
}

#[test]
fn test_manual_mode_tick_never_fires() {
    let settings = Settings {
        inline_suggestions: false,
        suggestion_mode: SuggestionMode::Manual,
    };
    let mut app = App::new(&test_config(10), settings, None);
    let (request_tx, request_rx) = mpsc::channel();
    let (_response_tx, response_rx) = mpsc::channel::<FetchResponse>();
    app.trigger.set_channels(request_tx, response_rx);

    app.on_content_changed();
    thread::sleep(Duration::from_millis(20));
    app.tick();

    assert!(request_rx.try_recv().is_err());
}
