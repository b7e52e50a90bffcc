//! Change feed for open builder tabs.
//!
//! Every admin session publishes onto one broadcast channel; each SSE
//! subscriber forwards only the events carrying its own session key.

use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream};
use marble_editor::Change;
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_stream::StreamExt;

pub const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventKind {
    /// First event on every stream
    Ready { version: u64 },
    /// The element tree changed
    Change { change: Change },
    /// Something failed; the page shows a blocking alert
    Alert { message: String },
    #[serde(rename_all = "camelCase")]
    Uploaded { element_id: String, url: String },
    #[serde(rename_all = "camelCase")]
    Saved {
        slug: String,
        mode: String,
        updated_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuilderEvent {
    pub session: String,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl BuilderEvent {
    pub fn new(session: impl Into<String>, kind: EventKind) -> Self {
        Self {
            session: session.into(),
            kind,
        }
    }

    pub fn alert(session: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            session,
            EventKind::Alert {
                message: message.into(),
            },
        )
    }

    fn to_sse(&self) -> Event {
        let json = serde_json::to_string(self).unwrap_or_default();
        Event::default().data(json)
    }
}

/// Publisher half, shared by every admin session
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BuilderEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Publish; having no listeners is not an error
    pub fn publish(&self, event: BuilderEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BuilderEvent> {
        self.sender.subscribe()
    }
}

/// SSE stream for one session: a `ready` event, then its broadcasts
pub fn session_stream(
    session: String,
    version: u64,
    rx: broadcast::Receiver<BuilderEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    let ready = BuilderEvent::new(session.clone(), EventKind::Ready { version });
    let initial = stream::once(async move { Ok(ready.to_sse()) });

    let updates = stream::unfold((session, rx), |(session, mut rx)| async move {
        loop {
            match rx.recv().await {
                Ok(event) if event.session == session => {
                    let sse = event.to_sse();
                    return Some((Ok(sse), (session, rx)));
                }
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(session = %session, skipped = n, "event subscriber lagged");
                }
                Err(RecvError::Closed) => {
                    tracing::info!(session = %session, "event channel closed");
                    return None;
                }
            }
        }
    });

    initial.chain(updates)
}

pub fn sse_response(
    stream: impl Stream<Item = Result<Event, Infallible>> + Send + 'static,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("ping"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_shape() {
        let event = BuilderEvent::new(
            "k1",
            EventKind::Uploaded {
                element_id: "e".into(),
                url: "/uploads/a.png".into(),
            },
        );
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "session": "k1", "type": "uploaded", "elementId": "e", "url": "/uploads/a.png" })
        );

        let change = BuilderEvent::new("k1", EventKind::Change { change: Change::Updated { id: "e".into() } });
        assert_eq!(
            serde_json::to_value(&change).unwrap(),
            json!({ "session": "k1", "type": "change", "change": { "kind": "updated", "id": "e" } })
        );
    }

    fn assert_send_static<T: Send + 'static>(_: &T) {}

    #[tokio::test]
    async fn test_stream_is_sendable_into_sse() {
        let bus = EventBus::new();
        let stream = session_stream("mine".into(), 0, bus.subscribe());
        assert_send_static(&stream);
        let sse = sse_response(stream);
        assert_send_static(&sse);
    }

    #[tokio::test]
    async fn test_stream_filters_by_session() {
        let bus = EventBus::new();
        let stream = session_stream("mine".into(), 3, bus.subscribe());
        tokio::pin!(stream);

        bus.publish(BuilderEvent::alert("other", "not for us"));
        bus.publish(BuilderEvent::alert("mine", "boom"));

        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_some());

        // Only two events were for this session
        let third = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
        assert!(third.is_err());
    }
}
