use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, Receiver, Sender};

use crate::errors::FeedError;
use crate::models::SensorReading;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FeedEvent {
    SensorReadingCreate(SensorReading),
}

/// Best-effort push channel towards front-end subscribers.
#[derive(Clone)]
pub struct LiveFeed {
    sender: Sender<FeedEvent>,
}

impl LiveFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);

        Self { sender }
    }

    pub fn subscribe(&self) -> Receiver<FeedEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of subscribers the event reached.
    pub fn push(&self, event: FeedEvent) -> Result<usize, FeedError> {
        self.sender.send(event).map_err(|_| FeedError::NoSubscribers)
    }
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;

    fn reading() -> SensorReading {
        SensorReading {
            id: 1,
            device_id: String::from("dev-abc123"),
            timestamp: Some(String::from("2025-12-18 10:00:00")),
            temperature_inside: Some(24.5),
            temperature_outside: None,
            humidity: Some(61.0),
            servo_1: None,
            servo_2: None,
            servo_3: None,
            servo_4: None,
            fan_1: None,
            fan_2: None,
            heater: None,
            raw_data: String::from(r#"{"temperature_inside":24.5,"humidity":61.0}"#),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn test_push_without_subscribers() {
        let feed = LiveFeed::default();

        assert!(matches!(
            feed.push(FeedEvent::SensorReadingCreate(reading())),
            Err(FeedError::NoSubscribers)
        ));
    }

    #[tokio::test]
    async fn test_push_reaches_subscribers() {
        let feed = LiveFeed::default();
        let mut receiver = feed.subscribe();

        assert_eq!(feed.push(FeedEvent::SensorReadingCreate(reading())).unwrap(), 1);

        let FeedEvent::SensorReadingCreate(received) = receiver.recv().await.unwrap();
        assert_eq!(received.device_id, "dev-abc123");
        assert_eq!(received.humidity, Some(61.0));
    }
}
