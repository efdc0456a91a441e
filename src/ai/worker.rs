//! Suggestion worker thread
//!
//! Runs fetches on a dedicated thread so network calls and backoff waits
//! never block the UI. Requests arrive over a channel, each carrying a
//! cancellation token that is checked at every suspension point; results go
//! back over a response channel tagged with their request id.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{Receiver, Sender};

use super::client::SuggestionClient;
use super::trigger::{FetchRequest, FetchResponse};

/// Spawn the suggestion worker thread.
///
/// The worker owns the client and a current-thread tokio runtime; all fetch
/// logic is single-threaded with suspension points only at network I/O and
/// the rate-limit backoff. A panic inside the worker is logged and reported
/// on the response channel rather than reaching the terminal.
pub fn spawn_worker(
    client: SuggestionClient,
    request_rx: Receiver<FetchRequest>,
    response_tx: Sender<FetchResponse>,
) {
    std::thread::spawn(move || {
        // The default panic hook prints to stderr, which corrupts the TUI
        let response_tx_clone = response_tx.clone();
        let prev_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let message = panic_message(panic_info.payload());
            log::error!(
                "Suggestion worker panic: {} at {:?}",
                message,
                panic_info.location()
            );
            let _ = response_tx_clone.send(FetchResponse::WorkerFailed(format!(
                "Error: suggestion worker crashed: {}",
                message
            )));
        }));

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create tokio runtime");
            rt.block_on(worker_loop(client, request_rx, response_tx));
        }));

        panic::set_hook(prev_hook);

        if let Err(e) = result {
            log::error!("Suggestion worker thread panicked: {}", panic_message(&*e));
        }
    });
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Process requests until the channel closes.
///
/// Blocking `recv()` is fine here since this is a dedicated thread. Each
/// fetch is raced against its cancellation token; cancellation wins ties.
async fn worker_loop(
    client: SuggestionClient,
    request_rx: Receiver<FetchRequest>,
    response_tx: Sender<FetchResponse>,
) {
    while let Ok(request) = request_rx.recv() {
        let FetchRequest::Fetch {
            prompt,
            request_id,
            cancel_token,
        } = request;

        if cancel_token.is_cancelled() {
            let _ = response_tx.send(FetchResponse::Cancelled { request_id });
            continue;
        }

        tokio::select! {
            biased;

            _ = cancel_token.cancelled() => {
                log::debug!("Fetch {} cancelled", request_id);
                let _ = response_tx.send(FetchResponse::Cancelled { request_id });
            }

            result = client.fetch_suggestion(&prompt) => {
                let _ = response_tx.send(FetchResponse::Completed { request_id, result });
            }
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod worker_tests;
