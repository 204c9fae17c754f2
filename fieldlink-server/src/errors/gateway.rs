#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Client error: {0}")]
    Client(#[from] rumqttc::ClientError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
