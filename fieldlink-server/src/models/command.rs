use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A control command addressed to the server by a device. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandMessage {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl CommandMessage {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(payload.clone()))
    }

    /// Token echoed back in the confirmation: the command's own timestamp, else its id.
    pub fn correlation_token(&self) -> Option<String> {
        self.timestamp
            .as_ref()
            .or(self.id.as_ref())
            .map(|value| match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
    }
}
