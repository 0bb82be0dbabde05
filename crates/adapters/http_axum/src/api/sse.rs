//! Server-Sent Events (SSE) stream for real-time updates.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use greencue_app::ports::{CommandStore, DeviceTransport, LatestValueCache, ReadingStore, RuleStore};

use crate::state::AppState;

/// `GET /api/events/stream`: SSE stream of broadcast channel messages.
///
/// Every message is sent as a `data:` frame holding `{channel, payload}`,
/// with the channel name also set as the SSE event name. The stream ends
/// when the client disconnects.
pub async fn stream<RS, C, R, S, T>(
    State(state): State<AppState<RS, C, R, S, T>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    let rx = state.broadcast.subscribe();
    let events = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(message) => match Event::default().event(&message.channel).json_data(&message) {
            Ok(event) => Some(Ok(event)),
            Err(err) => {
                tracing::warn!(%err, "failed to encode broadcast message for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(skipped = n, "SSE subscriber lagged, some messages were dropped");
            None
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
