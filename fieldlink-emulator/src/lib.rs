use std::env;
use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde::Deserialize;
use ::time::OffsetDateTime;
use tokio::sync::{mpsc, oneshot};
use tokio::time;

use crate::pending::PendingReplies;
use crate::settings::Settings;
use crate::simulate::{command_payload, telemetry_payload};

mod pending;
pub mod settings;
mod simulate;

const COMMAND_VARIABLE: &str = "EMULATOR_COMMAND";

#[derive(Debug, Deserialize)]
struct Confirmation {
    device_id: String,
    message_id: String,
    status: String,
}

/// Queues one confirmation subscription per device and signals readiness on the first connect.
fn subscribe_confirmations(client: &AsyncClient, topics: &[String], ready: &mut Option<oneshot::Sender<()>>) {
    for topic in topics {
        if let Err(e) = client.try_subscribe(topic.as_str(), QoS::AtLeastOnce) {
            tracing::error!(topic = %topic, "Failed to subscribe: {}", e);
        }
    }

    if let Some(ready) = ready.take() {
        let _ = ready.send(());
    }
}

pub async fn run(settings: &Arc<Settings>) -> Result<(), Box<dyn Error>> {
    let gateway = &settings.gateway;
    let devices = settings.emulator.devices.clone();

    let mut options = MqttOptions::new(&gateway.client_id, &gateway.host, gateway.port);
    options.set_keep_alive(Duration::from_secs(30));
    let (client, mut event_loop) = AsyncClient::new(options, 64);

    let (reply_tx, mut reply_rx) = mpsc::channel::<Confirmation>(64);
    let (ready_tx, ready_rx) = oneshot::channel();
    let subscriber = client.clone();
    let confirm_topics: Vec<String> = devices
        .iter()
        .map(|device_id| format!("{}/{}", gateway.topic.confirmation, device_id))
        .collect();

    tokio::spawn(async move {
        let mut ready = Some(ready_tx);
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    subscribe_confirmations(&subscriber, &confirm_topics, &mut ready);
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    match serde_json::from_slice::<Confirmation>(&publish.payload) {
                        Ok(confirmation) => {
                            if reply_tx.send(confirmation).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => tracing::warn!(topic = %publish.topic, "Unreadable confirmation: {}", e),
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("Broker connection error: {}", e);
                    time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    });

    // Confirmations are only delivered once subscribed
    ready_rx.await?;
    tracing::info!(devices = devices.len(), "Connected to broker");

    let mut pending = PendingReplies::new(Duration::from_secs(settings.emulator.reply_timeout_secs));

    if let Ok(command) = env::var(COMMAND_VARIABLE) {
        for device_id in &devices {
            let payload = command_payload(&command, OffsetDateTime::now_utc());
            let message_id = payload["timestamp"].as_str().unwrap_or_default().to_string();
            let topic = format!("{}/{}", gateway.topic.command, device_id);

            client
                .publish(topic.as_str(), QoS::AtLeastOnce, false, serde_json::to_vec(&payload)?)
                .await?;
            pending.expect(device_id, &message_id, Instant::now());

            tracing::info!(device_id = %device_id, command = %command, "Sent command");
        }
    }

    let mut interval = time::interval(Duration::from_secs(settings.emulator.interval_secs.max(1)));
    loop {
        tokio::select! {
            Some(confirmation) = reply_rx.recv() => {
                match pending.resolve(&confirmation.device_id, &confirmation.message_id, Instant::now()) {
                    Some(elapsed) => tracing::info!(
                        device_id = %confirmation.device_id,
                        message_id = %confirmation.message_id,
                        status = %confirmation.status,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Confirmation received"
                    ),
                    None => tracing::debug!(
                        device_id = %confirmation.device_id,
                        message_id = %confirmation.message_id,
                        "Unexpected confirmation"
                    ),
                }
            },
            _ = interval.tick() => {
                for (device_id, message_id) in pending.expire(Instant::now()) {
                    tracing::warn!(device_id = %device_id, message_id = %message_id, "No confirmation within timeout");
                }

                tracing::debug!(waiting = pending.len(), "Publishing telemetry");

                let now = OffsetDateTime::now_utc();
                for device_id in &devices {
                    let payload = telemetry_payload(&mut rand::rng(), now);
                    let message_id = payload["timestamp"].as_str().unwrap_or_default().to_string();
                    let topic = format!("{}/{}", gateway.topic.telemetry, device_id);

                    tracing::debug!("Send: {}", &payload);

                    client
                        .publish(topic.as_str(), QoS::AtLeastOnce, false, serde_json::to_vec(&payload)?)
                        .await?;
                    pending.expect(device_id, &message_id, Instant::now());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_readiness_follows_subscriptions() {
        let (client, _event_loop) = AsyncClient::new(MqttOptions::new("emulator-test", "localhost", 1883), 8);
        let topics = vec![
            String::from("confirmation/test_device_001"),
            String::from("confirmation/test_device_002"),
        ];
        let (ready_tx, mut ready_rx) = oneshot::channel();
        let mut ready = Some(ready_tx);

        assert!(ready_rx.try_recv().is_err());

        subscribe_confirmations(&client, &topics, &mut ready);
        assert!(ready.is_none());
        assert!(ready_rx.try_recv().is_ok());

        // A reconnect subscribes again without signalling twice
        subscribe_confirmations(&client, &topics, &mut ready);
        assert!(ready.is_none());
    }
}
