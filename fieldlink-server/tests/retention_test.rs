use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use fieldlink_server::services::RetentionService;
use time::OffsetDateTime;

mod common;
use common::mock_app::MockApp;

const DAY: Duration = Duration::from_secs(86_400);

fn write_image(path: &Path, bytes: usize, modified: SystemTime) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![0u8; bytes]).unwrap();
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(modified)
        .unwrap();
}

#[tokio::test]
async fn test_readings_are_purged_by_reported_day() {
    let app = MockApp::new().await;
    let now = OffsetDateTime::now_utc();

    let horizon_day = RetentionService::cutoff_date(now - time::Duration::days(7));
    let day_before = RetentionService::cutoff_date(now - time::Duration::days(8));

    app.insert_reading("dev-abc123", &format!("{horizon_day} 00:00:00")).await;
    app.insert_reading("dev-abc123", &format!("{day_before} 23:59:59")).await;
    app.insert_reading("dev-abc123", &format!("{day_before}T08:00:00")).await;
    app.insert_reading("dev-abc123", &RetentionService::cutoff_date(now)).await;

    let report = app.app.retention_service.sweep_at(now).await;

    assert_eq!(report.readings_deleted, 2);
    assert_eq!(report.failures, 0);

    let remaining: Vec<(String,)> = sqlx::query_as("SELECT timestamp FROM sensor_data ORDER BY timestamp")
        .fetch_all(app.app.storage.get_pool())
        .await
        .unwrap();
    assert_eq!(remaining.len(), 2);
    assert_eq!(remaining[0].0, format!("{horizon_day} 00:00:00"));
}

#[tokio::test]
async fn test_images_are_purged_by_modification_time() {
    let images = tempfile::tempdir().unwrap();
    let root = images.path().to_path_buf();
    let app = MockApp::with_settings(|settings| {
        settings.retention.image_path = root.to_string_lossy().to_string();
    })
    .await;

    let now = SystemTime::now();
    write_image(&root.join("old.jpg"), 100, now - 8 * DAY);
    write_image(&root.join("new.jpg"), 10, now - DAY);
    write_image(&root.join("dev-a/2025-12-01/old.jpg"), 50, now - 10 * DAY);
    write_image(&root.join("dev-b/old.jpg"), 25, now - 9 * DAY);
    write_image(&root.join("dev-b/new.jpg"), 5, now);

    let report = app.app.retention_service.sweep_at(OffsetDateTime::from(now)).await;

    assert_eq!(report.files_deleted, 3);
    assert_eq!(report.bytes_freed, 175);
    assert_eq!(report.directories_removed, 2);
    assert_eq!(report.failures, 0);

    assert!(!root.join("old.jpg").exists());
    assert!(root.join("new.jpg").exists());
    assert!(!root.join("dev-a").exists());
    assert!(root.join("dev-b/new.jpg").exists());
    assert!(!root.join("dev-b/old.jpg").exists());
    assert!(root.exists());
}

#[tokio::test]
async fn test_empty_image_root_is_kept() {
    let images = tempfile::tempdir().unwrap();
    let root = images.path().to_path_buf();
    fs::create_dir_all(root.join("empty/nested")).unwrap();

    let app = MockApp::with_settings(|settings| {
        settings.retention.image_path = root.to_string_lossy().to_string();
    })
    .await;

    let report = app.app.retention_service.sweep().await;

    assert_eq!(report.directories_removed, 2);
    assert!(root.exists());
    assert!(!root.join("empty").exists());
}

#[tokio::test]
async fn test_sweep_survives_missing_table() {
    let app = MockApp::new().await;

    sqlx::query("DROP TABLE sensor_data")
        .execute(app.app.storage.get_pool())
        .await
        .unwrap();

    let report = app.app.retention_service.sweep().await;

    assert_eq!(report.readings_deleted, 0);
    assert_eq!(report.failures, 1);
}

#[tokio::test]
async fn test_unrepresentable_horizon_skips_sweep() {
    let app = MockApp::with_settings(|settings| settings.retention.days = i64::MAX).await;
    app.insert_reading("dev-abc123", "2000-01-01 00:00:00").await;

    let report = app.app.retention_service.sweep().await;

    assert_eq!(report.readings_deleted, 0);
    assert_eq!(report.failures, 1);
    assert_eq!(app.count("sensor_data").await, 1);

    let app = MockApp::with_settings(|settings| settings.retention.days = 5_000_000).await;
    let report = app.app.retention_service.sweep().await;

    assert_eq!(report.failures, 1);
}
