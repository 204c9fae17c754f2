#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use fieldlink_server::app::{App, create_app, create_feed_router};
use fieldlink_server::configs::Settings;
use fieldlink_server::models::SensorReading;
use fieldlink_server::services::{Confirmation, RecordingPublisher, RouteOutcome};

const DEFAULT_SETTINGS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../",
    "configs/default.toml"
));

pub struct MockApp {
    pub settings: Settings,
    pub app: App,
    pub publisher: Arc<RecordingPublisher>,
    pub router: Router,
}

impl MockApp {
    pub async fn new() -> Self {
        Self::with_settings(|_| {}).await
    }

    pub async fn with_settings(configure: impl FnOnce(&mut Settings)) -> Self {
        let mut settings = Settings::from_sources(DEFAULT_SETTINGS, None, Vec::new()).unwrap();
        settings.database.url = String::from("sqlite::memory:");
        settings.database.clean_start = true;
        settings.retention.image_path = String::from("/nonexistent/fieldlink/images");
        configure(&mut settings);

        let publisher = Arc::new(RecordingPublisher::default());
        let app = create_app(&settings, publisher.clone()).await.unwrap();
        let router = create_feed_router(&app);

        Self {
            settings,
            app,
            publisher,
            router,
        }
    }

    pub async fn publish(&self, topic: &str, payload: serde_json::Value) -> RouteOutcome {
        self.app
            .router
            .route(topic, &serde_json::to_vec(&payload).unwrap())
            .await
    }

    pub fn confirmations(&self) -> Vec<(String, Confirmation)> {
        self.publisher.confirmations()
    }

    pub async fn count(&self, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.app.storage.get_pool())
            .await
            .unwrap();
        count
    }

    pub async fn readings(&self) -> Vec<SensorReading> {
        sqlx::query_as::<_, SensorReading>("SELECT * FROM sensor_data ORDER BY id")
            .fetch_all(self.app.storage.get_pool())
            .await
            .unwrap()
    }

    pub async fn insert_reading(&self, device_id: &str, timestamp: &str) {
        sqlx::query("INSERT INTO sensor_data (device_id, timestamp, raw_data) VALUES ($1, $2, '{}')")
            .bind(device_id)
            .bind(timestamp)
            .execute(self.app.storage.get_pool())
            .await
            .unwrap();
    }
}
