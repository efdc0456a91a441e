//! Trigger controller
//!
//! Decides when a suggestion fetch starts and where its result lands.
//! Content changes feed a debounce timer in automatic mode; manual mode
//! fetches only on an explicit request. Every fetch carries a sequence
//! number so only the most recent outstanding request delivers, and a
//! cancellation token so superseded fetches stop at their next suspension
//! point instead of running to completion.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::client::SuggestionResult;
use super::debouncer::Debouncer;
use crate::editor::Position;

/// How suggestion fetches are triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionMode {
    /// Debounced fetch on every content change
    #[default]
    Automatic,
    /// Fetch only on the explicit request action
    Manual,
}

impl SuggestionMode {
    pub fn toggled(self) -> Self {
        match self {
            SuggestionMode::Automatic => SuggestionMode::Manual,
            SuggestionMode::Manual => SuggestionMode::Automatic,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SuggestionMode::Automatic => "auto",
            SuggestionMode::Manual => "manual",
        }
    }
}

/// Request messages sent to the suggestion worker thread
#[derive(Debug)]
pub enum FetchRequest {
    Fetch {
        prompt: String,
        /// Sequence number used to filter stale responses
        request_id: u64,
        /// Cancelled when the fetch is superseded; the worker observes it
        /// at suspension points
        cancel_token: CancellationToken,
    },
}

/// Response messages received from the suggestion worker thread
#[derive(Debug)]
pub enum FetchResponse {
    /// The fetch ran to completion (successfully or not)
    Completed {
        request_id: u64,
        result: SuggestionResult,
    },
    /// The fetch observed its cancellation token
    Cancelled { request_id: u64 },
    /// The worker itself failed; not tied to a specific request
    WorkerFailed(String),
}

/// Where delivered suggestions go. The app implements this over the editor
/// and panel; tests implement it with a recorder.
pub trait SuggestionSurface {
    /// Insert suggestion text at the position captured when the fetch began
    fn insert_at(&mut self, position: Position, text: &str);
    /// Show text in the read-only suggestions panel
    fn show_in_panel(&mut self, text: &str);
}

#[derive(Debug)]
struct InFlight {
    request_id: u64,
    /// Cursor position captured at request initiation, not completion
    cursor: Position,
    cancel_token: CancellationToken,
}

/// Owns the trigger policy state: mode, debounce timer, the in-flight
/// request, and the channels to the worker thread.
pub struct TriggerController {
    mode: SuggestionMode,
    debouncer: Debouncer,
    request_tx: Option<Sender<FetchRequest>>,
    response_rx: Option<Receiver<FetchResponse>>,
    next_request_id: u64,
    in_flight: Option<InFlight>,
}

impl TriggerController {
    pub fn new(mode: SuggestionMode, debounce_ms: u64) -> Self {
        Self {
            mode,
            debouncer: Debouncer::new(debounce_ms),
            request_tx: None,
            response_rx: None,
            next_request_id: 0,
            in_flight: None,
        }
    }

    /// Wire up the channels to the worker thread.
    pub fn set_channels(&mut self, tx: Sender<FetchRequest>, rx: Receiver<FetchResponse>) {
        self.request_tx = Some(tx);
        self.response_rx = Some(rx);
    }

    pub fn mode(&self) -> SuggestionMode {
        self.mode
    }

    /// Switch trigger mode.
    ///
    /// Leaving automatic mode drops the pending timer; an in-flight fetch is
    /// left alone, its result still subject to the stale guard.
    pub fn set_mode(&mut self, mode: SuggestionMode) {
        if self.mode == mode {
            return;
        }
        if mode == SuggestionMode::Manual {
            self.debouncer.cancel();
        }
        self.mode = mode;
    }

    /// Record a content change.
    ///
    /// In automatic mode this restarts the debounce timer and cancels the
    /// in-flight fetch, which the edit has invalidated. In manual mode the
    /// timer is inert and changes are ignored.
    pub fn on_content_changed(&mut self) {
        if self.mode != SuggestionMode::Automatic {
            return;
        }
        self.cancel_in_flight();
        self.debouncer.schedule();
    }

    /// True when the debounce timer has expired and a fetch should start
    /// for the current content snapshot.
    pub fn debounce_ready(&self) -> bool {
        self.debouncer.is_ready()
    }

    /// Start a fetch for `prompt`, superseding any in-flight request.
    ///
    /// Captures the cursor position for later inline delivery and clears the
    /// debounce state. Returns false when no worker is connected.
    pub fn start_fetch(&mut self, prompt: String, cursor: Position) -> bool {
        // One fetch attempt per expiry, even if the worker is gone
        self.debouncer.mark_fired();

        if self.request_tx.is_none() {
            return false;
        }

        self.cancel_in_flight();

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        let cancel_token = CancellationToken::new();

        let sent = self
            .request_tx
            .as_ref()
            .expect("request_tx presence checked above")
            .send(FetchRequest::Fetch {
                prompt,
                request_id,
                cancel_token: cancel_token.clone(),
            })
            .is_ok();

        if sent {
            self.in_flight = Some(InFlight {
                request_id,
                cursor,
                cancel_token,
            });
            log::debug!("Started fetch {}", request_id);
        }

        sent
    }

    /// Cancel the in-flight fetch, if any. Returns true if one was cancelled.
    pub fn cancel_in_flight(&mut self) -> bool {
        match self.in_flight.take() {
            Some(in_flight) => {
                log::debug!("Cancelling fetch {}", in_flight.request_id);
                in_flight.cancel_token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn current_request_id(&self) -> u64 {
        self.next_request_id
    }

    /// Drain the response channel and deliver results.
    ///
    /// Returns true if anything was delivered or discarded, so the caller
    /// knows to re-render.
    pub fn poll_responses<S: SuggestionSurface>(
        &mut self,
        surface: &mut S,
        inline_enabled: bool,
    ) -> bool {
        let mut responses = Vec::new();
        if let Some(ref rx) = self.response_rx {
            loop {
                match rx.try_recv() {
                    Ok(response) => responses.push(response),
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            }
        }

        let had_responses = !responses.is_empty();
        for response in responses {
            self.handle_response(response, surface, inline_enabled);
        }
        had_responses
    }

    /// Deliver a single worker response.
    ///
    /// Only the most recent outstanding request may deliver; anything else
    /// is stale and discarded. Successful suggestions go inline at the
    /// captured cursor position when inline display is enabled, otherwise to
    /// the panel. Failures always go to the panel so the editor text is
    /// never polluted with error strings.
    pub fn handle_response<S: SuggestionSurface>(
        &mut self,
        response: FetchResponse,
        surface: &mut S,
        inline_enabled: bool,
    ) {
        match response {
            FetchResponse::Completed { request_id, result } => {
                let is_current =
                    matches!(&self.in_flight, Some(f) if f.request_id == request_id);
                if !is_current {
                    log::debug!("Discarding stale result from fetch {}", request_id);
                    return;
                }
                let Some(in_flight) = self.in_flight.take() else {
                    return;
                };

                match result {
                    SuggestionResult::Success(text) if inline_enabled => {
                        surface.insert_at(in_flight.cursor, &text);
                    }
                    SuggestionResult::Success(text) => {
                        surface.show_in_panel(&text);
                    }
                    failure => {
                        log::warn!("Fetch {} failed: {}", request_id, failure);
                        surface.show_in_panel(&failure.to_string());
                    }
                }
            }
            FetchResponse::Cancelled { request_id } => {
                log::debug!("Fetch {} acknowledged cancellation", request_id);
                if matches!(&self.in_flight, Some(f) if f.request_id == request_id) {
                    self.in_flight = None;
                }
            }
            FetchResponse::WorkerFailed(message) => {
                log::error!("Suggestion worker failed: {}", message);
                self.in_flight = None;
                surface.show_in_panel(&message);
            }
        }
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod trigger_tests;
