use std::convert::Infallible;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::services::LiveFeed;

#[derive(Clone)]
pub struct SSEState {
    pub feed: LiveFeed,
}

pub async fn sse_handler(State(state): State<SSEState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.feed.subscribe();

    let stream = BroadcastStream::new(receiver).filter_map(|result| match result {
        Ok(event) => match Event::default().json_data(&event) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::warn!("Failed to encode feed event: {}", e);
                None
            }
        },
        // Lagged subscribers skip what they missed
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
