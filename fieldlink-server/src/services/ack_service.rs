use std::sync::{Arc, Mutex};

use rumqttc::QoS;
use serde::{Deserialize, Serialize};

use crate::errors::GatewayError;
use crate::models::DeviceId;

/// Outbound half of the broker connection.
pub trait Publisher: Send + Sync {
    fn publish(&self, topic: &str, qos: QoS, payload: Vec<u8>) -> Result<(), GatewayError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub device_id: String,
    pub message_id: String,
    pub status: AckStatus,
}

/// Publishes confirmations to `{prefix}/{device_id}`. Fire and forget.
pub struct Acknowledger {
    publisher: Arc<dyn Publisher>,
    prefix: String,
}

impl Acknowledger {
    pub fn new(publisher: Arc<dyn Publisher>, prefix: String) -> Self {
        Self { publisher, prefix }
    }

    pub fn topic_for(&self, device_id: &DeviceId) -> String {
        format!("{}/{}", self.prefix, device_id)
    }

    pub fn confirm(&self, device_id: &DeviceId, message_id: &str, status: AckStatus) {
        let topic = self.topic_for(device_id);

        if let Err(e) = self.send(&topic, device_id, message_id, status) {
            tracing::warn!(device_id = %device_id, topic = %topic, "Failed to send confirmation: {}", e);
            return;
        }

        tracing::debug!(device_id = %device_id, topic = %topic, message_id, "Sent confirmation");
    }

    fn send(
        &self,
        topic: &str,
        device_id: &DeviceId,
        message_id: &str,
        status: AckStatus,
    ) -> Result<(), GatewayError> {
        let payload = serde_json::to_vec(&Confirmation {
            device_id: device_id.to_string(),
            message_id: message_id.to_string(),
            status,
        })?;

        self.publisher.publish(topic, QoS::AtLeastOnce, payload)
    }
}

/// Keeps every publish in memory. Used where no broker is available.
#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.published
            .lock()
            .map(|published| published.clone())
            .unwrap_or_default()
    }

    pub fn confirmations(&self) -> Vec<(String, Confirmation)> {
        self.published()
            .into_iter()
            .filter_map(|(topic, payload)| {
                serde_json::from_slice(&payload)
                    .ok()
                    .map(|confirmation| (topic, confirmation))
            })
            .collect()
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, topic: &str, _qos: QoS, payload: Vec<u8>) -> Result<(), GatewayError> {
        if let Ok(mut published) = self.published.lock() {
            published.push((topic.to_string(), payload));
        }

        Ok(())
    }
}
