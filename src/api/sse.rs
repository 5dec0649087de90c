//! Server-Sent Events support

use crate::runtime::SessionHandle;
use crate::session::{SessionEvent, SessionSnapshot};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

/// Convert broadcast stream to SSE stream
///
/// The receiver must be subscribed before `snapshot` is taken, so an
/// exchange may show up in both; clients dedupe by `index`.
pub fn sse_stream(
    handle: SessionHandle,
    snapshot: SessionSnapshot,
    broadcast_rx: broadcast::Receiver<SessionEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = payload_stream(handle, snapshot, broadcast_rx)
        .map(|(event_type, data)| Ok(Event::default().event(event_type).data(data.to_string())));

    Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// `init` first, then one payload per session event.
///
/// A receiver that falls behind gets a fresh `init` in place of the
/// events it missed.
fn payload_stream(
    handle: SessionHandle,
    snapshot: SessionSnapshot,
    broadcast_rx: broadcast::Receiver<SessionEvent>,
) -> impl Stream<Item = (&'static str, Value)> {
    let init = stream::once(async move { init_payload(&snapshot) });

    let updates = BroadcastStream::new(broadcast_rx).filter_map(move |result| {
        let handle = handle.clone();
        async move {
            match result {
                Ok(event) => Some(event_payload(&event)),
                Err(BroadcastStreamRecvError::Lagged(missed)) => {
                    tracing::warn!(
                        session_id = handle.id(),
                        missed,
                        "Observer lagged, resending transcript"
                    );
                    handle.snapshot().await.map(|fresh| init_payload(&fresh))
                }
            }
        }
    });

    init.chain(updates)
}

fn init_payload(snapshot: &SessionSnapshot) -> (&'static str, Value) {
    (
        "init",
        json!({
            "type": "init",
            "transcript": snapshot.transcript,
            "pending": snapshot.pending,
        }),
    )
}

fn event_payload(event: &SessionEvent) -> (&'static str, Value) {
    match event {
        SessionEvent::ExchangeAppended { index, exchange } => (
            "exchange",
            json!({
                "type": "exchange",
                "index": index,
                "exchange": exchange,
            }),
        ),
        SessionEvent::PendingChanged { pending } => (
            "pending",
            json!({
                "type": "pending",
                "pending": pending,
            }),
        ),
    }
}
