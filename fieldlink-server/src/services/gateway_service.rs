use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};

use crate::configs::Gateway;
use crate::errors::GatewayError;
use crate::services::{MessageRouter, Publisher};

const REQUEST_CAPACITY: usize = 10;
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

pub fn create_client(gateway: &Gateway) -> (AsyncClient, EventLoop) {
    let mut options = MqttOptions::new(&gateway.client_id, &gateway.host, gateway.port);
    options.set_keep_alive(Duration::from_secs(gateway.keep_alive_secs));

    AsyncClient::new(options, REQUEST_CAPACITY)
}

/// Publishes through the shared client without waiting on its request queue.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

impl Publisher for MqttPublisher {
    fn publish(&self, topic: &str, qos: QoS, payload: Vec<u8>) -> Result<(), GatewayError> {
        self.client.try_publish(topic, qos, false, payload)?;

        Ok(())
    }
}

pub struct GatewayService {
    client: AsyncClient,
    event_loop: EventLoop,
    router: Arc<MessageRouter>,
}

impl GatewayService {
    pub fn new(client: AsyncClient, event_loop: EventLoop, router: Arc<MessageRouter>) -> Self {
        Self {
            client,
            event_loop,
            router,
        }
    }

    /// Drives the connection forever, one inbound message at a time.
    pub async fn run(mut self) {
        loop {
            match self.event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    tracing::info!("Connected to broker");
                    self.subscribe_all();
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    tracing::debug!(topic = %publish.topic, bytes = publish.payload.len(), "Received message");
                    self.router.route(&publish.topic, &publish.payload).await;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("Broker connection error: {}", e);
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }

    fn subscribe_all(&self) {
        for filter in self.router.filters() {
            match self.client.try_subscribe(filter.as_str(), QoS::AtLeastOnce) {
                Ok(()) => tracing::info!(topic = %filter, "Subscribed"),
                Err(e) => tracing::error!(topic = %filter, "Failed to subscribe: {}", e),
            }
        }
    }
}
