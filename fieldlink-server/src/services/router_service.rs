use std::sync::Arc;

use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::configs::GatewayTopic;
use crate::models::{CommandMessage, DeviceId, NewSensorReading};
use crate::services::{
    AckStatus, Acknowledger, CommandHandler, DeviceRegistry, FeedEvent, LiveFeed, Registration,
    TelemetryService,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Payload was not a JSON object; nothing else happened.
    Malformed,
    /// The device identifier was invalid; nothing was stored or confirmed.
    Rejected,
    /// Reading stored under this row id and confirmed.
    Stored(i64),
    /// Storing the reading failed; no confirmation was sent.
    StoreFailed,
    /// Command handled and confirmed with this status.
    Commanded(AckStatus),
    /// Topic belongs to neither family.
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Telemetry,
    Command,
}

pub struct MessageRouter {
    topics: GatewayTopic,
    registry: Arc<DeviceRegistry>,
    telemetry: Arc<TelemetryService>,
    feed: LiveFeed,
    commands: Arc<dyn CommandHandler>,
    acknowledger: Acknowledger,
}

impl MessageRouter {
    pub fn new(
        topics: GatewayTopic,
        registry: Arc<DeviceRegistry>,
        telemetry: Arc<TelemetryService>,
        feed: LiveFeed,
        commands: Arc<dyn CommandHandler>,
        acknowledger: Acknowledger,
    ) -> Self {
        Self {
            topics,
            registry,
            telemetry,
            feed,
            commands,
            acknowledger,
        }
    }

    /// Subscription filters for both inbound families.
    pub fn filters(&self) -> [String; 2] {
        [
            format!("{}/+", self.topics.telemetry),
            format!("{}/+", self.topics.command),
        ]
    }

    pub async fn route(&self, topic: &str, payload: &[u8]) -> RouteOutcome {
        let body: Map<String, Value> = match serde_json::from_slice(payload) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    topic,
                    payload = %String::from_utf8_lossy(payload),
                    "Dropped malformed payload: {}",
                    e
                );
                return RouteOutcome::Malformed;
            }
        };

        let (family, raw_device_id) = self.classify(topic);

        let registration = self.registry.register(raw_device_id).await;
        if let Ok(Registration::Rejected) = registration {
            return RouteOutcome::Rejected;
        }

        // Registration has already rejected anything that does not parse
        let Some(device_id) = DeviceId::parse(raw_device_id) else {
            return RouteOutcome::Rejected;
        };

        match family {
            Some(Family::Telemetry) => {
                self.on_telemetry(&device_id, &body, &String::from_utf8_lossy(payload))
                    .await
            }
            Some(Family::Command) => self.on_command(&device_id, &body).await,
            None => {
                tracing::warn!(topic, "Ignored message on unrecognized topic");
                RouteOutcome::Unrecognized
            }
        }
    }

    async fn on_telemetry(&self, device_id: &DeviceId, body: &Map<String, Value>, raw: &str) -> RouteOutcome {
        let reading = NewSensorReading::from_payload(device_id, body, raw, OffsetDateTime::now_utc());

        let saved = match self.telemetry.save(&reading).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::error!(device_id = %device_id, "Failed to store sensor reading: {}", e);
                return RouteOutcome::StoreFailed;
            }
        };

        let id = saved.id;
        if let Err(e) = self.feed.push(FeedEvent::SensorReadingCreate(saved)) {
            tracing::debug!(device_id = %device_id, "Live feed push skipped: {}", e);
        }

        self.acknowledger.confirm(device_id, &reading.timestamp, AckStatus::Success);

        RouteOutcome::Stored(id)
    }

    async fn on_command(&self, device_id: &DeviceId, body: &Map<String, Value>) -> RouteOutcome {
        let message = match CommandMessage::from_payload(body) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(device_id = %device_id, "Dropped malformed command: {}", e);
                return RouteOutcome::Malformed;
            }
        };

        let status = match self.commands.handle(device_id, &message).await {
            Ok(()) => AckStatus::Success,
            Err(e) => {
                tracing::warn!(device_id = %device_id, command = %message.command, "Command failed: {}", e);
                AckStatus::Failed
            }
        };

        let message_id = message
            .correlation_token()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        self.acknowledger.confirm(device_id, &message_id, status);

        RouteOutcome::Commanded(status)
    }

    /// Family of `topic` and its device segment, `unknown` when the segment is missing.
    fn classify<'a>(&self, topic: &'a str) -> (Option<Family>, &'a str) {
        if let Some(segment) = device_segment(&self.topics.telemetry, topic) {
            return (Some(Family::Telemetry), segment);
        }

        if let Some(segment) = device_segment(&self.topics.command, topic) {
            return (Some(Family::Command), segment);
        }

        let depth = self.topics.telemetry.split('/').count();
        let segment = topic
            .split('/')
            .nth(depth)
            .filter(|segment| !segment.is_empty())
            .unwrap_or(DeviceId::UNKNOWN);

        (None, segment)
    }
}

fn device_segment<'a>(prefix: &str, topic: &'a str) -> Option<&'a str> {
    let mut segments = topic.split('/');

    for expected in prefix.split('/') {
        if segments.next()? != expected {
            return None;
        }
    }

    Some(
        segments
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or(DeviceId::UNKNOWN),
    )
}
