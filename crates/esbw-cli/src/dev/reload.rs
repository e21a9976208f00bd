//! Live-reload event stream.
//!
//! Every connection gets a long-lived `text/event-stream` response. It
//! carries a `message`/`finished` event once per completed build and a
//! `ping`/`idle` event every 60 seconds so intermediaries keep it open.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tokio::time::{Instant, interval_at};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::{BroadcastStream, IntervalStream};
use tower_http::cors::{Any, CorsLayer};

use crate::orchestrator::CompletionSignal;

/// Interval of the idle keep-alive message.
pub const IDLE_INTERVAL: Duration = Duration::from_secs(60);

/// Router of the live-reload listener. Any path opens a stream.
pub fn reload_router(completion: CompletionSignal) -> Router {
    Router::new()
        .route("/", get(handle_stream))
        .fallback(handle_stream)
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(completion)
}

async fn handle_stream(
    State(completion): State<CompletionSignal>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(clients = completion.subscriber_count() + 1, "live-reload client connected");
    Sse::new(event_stream(&completion))
}

/// The events one connection observes, starting now.
pub fn event_stream(completion: &CompletionSignal) -> impl Stream<Item = Result<Event, Infallible>> + use<> {
    // A lagged receiver still owes the client a reload.
    let finished = BroadcastStream::new(completion.subscribe())
        .map(|_| Ok::<_, Infallible>(Event::default().event("message").data("finished")));

    let idle = IntervalStream::new(interval_at(Instant::now() + IDLE_INTERVAL, IDLE_INTERVAL))
        .map(|_| Ok::<_, Infallible>(Event::default().event("ping").data("idle")));

    finished.merge(idle)
}
