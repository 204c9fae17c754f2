use std::error::Error;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::app::{create_app, create_feed_router};
use crate::configs::Settings;
use crate::services::{GatewayService, MqttPublisher, create_client};

pub mod app;
pub mod configs;
pub mod errors;
pub mod handles;
pub mod models;
pub mod repositories;
pub mod services;

pub async fn run(settings: &Arc<Settings>) -> Result<(), Box<dyn Error>> {
    let (client, event_loop) = create_client(&settings.gateway);
    let app = create_app(settings, Arc::new(MqttPublisher::new(client.clone()))).await?;

    app.retention_service.start();

    if settings.server.enabled {
        let ip_addr = settings.server.host.parse::<IpAddr>()?;
        let address = SocketAddr::from((ip_addr, settings.server.port));
        let listener = TcpListener::bind(&address).await?;

        tracing::info!("listening on {:?}", address);

        let feed_router = create_feed_router(&app);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, feed_router).await {
                tracing::error!("Live feed server stopped: {}", e);
            }
        });
    }

    tracing::info!(
        host = %settings.gateway.host,
        port = settings.gateway.port,
        "Connecting to broker"
    );

    let gateway = GatewayService::new(client, event_loop, app.router.clone());

    tokio::select! {
        _ = gateway.run() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}
