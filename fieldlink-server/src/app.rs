use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::{SchemaManager, Settings, Storage};
use crate::handles::*;
use crate::services::{
    Acknowledger, AuthService, DeviceRegistry, InMemoryRateLimiter, LiveFeed, LoggingCommandHandler,
    MessageRouter, Publisher, RetentionService, TelemetryService,
};

/// The wired service graph shared by the broker loop, the sweeper and the feed.
pub struct App {
    pub storage: Arc<Storage>,
    pub registry: Arc<DeviceRegistry>,
    pub telemetry_service: Arc<TelemetryService>,
    pub feed: LiveFeed,
    pub router: Arc<MessageRouter>,
    pub retention_service: Arc<RetentionService>,
}

pub async fn create_app(settings: &Settings, publisher: Arc<dyn Publisher>) -> Result<App, sqlx::Error> {
    let storage = Arc::new(Storage::new(settings.database.clone(), SchemaManager::default()).await?);
    let feed = LiveFeed::default();

    let registry = Arc::new(DeviceRegistry::new(
        storage.clone(),
        Arc::new(AuthService::new()),
        Arc::new(InMemoryRateLimiter::new(Duration::from_secs(settings.registry.window_secs))),
        settings.registry.default_password.clone(),
    ));
    let telemetry_service = Arc::new(TelemetryService::new(storage.clone()));

    let router = Arc::new(MessageRouter::new(
        settings.gateway.topic.clone(),
        registry.clone(),
        telemetry_service.clone(),
        feed.clone(),
        Arc::new(LoggingCommandHandler),
        Acknowledger::new(publisher, settings.gateway.topic.confirmation.clone()),
    ));

    let retention_service = Arc::new(RetentionService::new(telemetry_service.clone(), &settings.retention));

    Ok(App {
        storage,
        registry,
        telemetry_service,
        feed,
        router,
        retention_service,
    })
}

pub fn create_feed_router(app: &App) -> Router {
    let sensors = Router::new()
        .route("/data", get(get_recent_readings))
        .with_state(SensorState {
            telemetry_service: app.telemetry_service.clone(),
        });

    let devices = Router::new()
        .route("/", get(get_devices))
        .with_state(DeviceState {
            storage: app.storage.clone(),
        });

    let sse = Router::new()
        .route("/", get(sse_handler))
        .with_state(SSEState {
            feed: app.feed.clone(),
        });

    Router::new()
        .nest("/sensors", sensors)
        .nest("/devices", devices)
        .nest("/event", sse)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
