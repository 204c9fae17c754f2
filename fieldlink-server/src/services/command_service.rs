use async_trait::async_trait;

use crate::errors::CommandError;
use crate::models::{CommandMessage, DeviceId};

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, device_id: &DeviceId, message: &CommandMessage) -> Result<(), CommandError>;
}

/// Records commands without acting on them.
pub struct LoggingCommandHandler;

#[async_trait]
impl CommandHandler for LoggingCommandHandler {
    async fn handle(&self, device_id: &DeviceId, message: &CommandMessage) -> Result<(), CommandError> {
        if message.command.is_empty() {
            return Err(CommandError::MissingCommand);
        }

        tracing::info!(
            device_id = %device_id,
            command = %message.command,
            params = %serde_json::Value::Object(message.params.clone()),
            "Received command"
        );

        match message.command.as_str() {
            "restart" => tracing::info!(device_id = %device_id, "Restart requested"),
            other => tracing::debug!(device_id = %device_id, command = other, "No action bound to command"),
        }

        Ok(())
    }
}
