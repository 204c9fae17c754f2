use std::sync::Arc;
use std::time::Duration;

use fieldlink_server::services::{AuthService, DeviceRegistry, InMemoryRateLimiter, Registration};

mod common;
use common::mock_app::MockApp;

fn second_registry(app: &MockApp) -> DeviceRegistry {
    DeviceRegistry::new(
        app.app.storage.clone(),
        Arc::new(AuthService::new()),
        Arc::new(InMemoryRateLimiter::new(Duration::from_secs(60))),
        String::from("123456"),
    )
}

#[tokio::test]
async fn test_concurrent_registrations_never_duplicate() {
    let app = MockApp::new().await;
    let other = Arc::new(second_registry(&app));
    let registry = app.app.registry.clone();

    let (first, second) = tokio::join!(registry.register("dev-race"), other.register("dev-race"));

    assert_eq!(first.unwrap(), Registration::Accepted);
    assert_eq!(second.unwrap(), Registration::Accepted);
    assert_eq!(app.count("devices").await, 1);
    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn test_concurrent_attempts_on_one_registry_are_throttled() {
    let app = MockApp::new().await;
    let registry = app.app.registry.clone();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.register("dev-burst").await.unwrap() })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap() == Registration::Accepted {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(app.count("devices").await, 1);
}

#[tokio::test]
async fn test_uniqueness_conflict_counts_as_registered() {
    let app = MockApp::new().await;
    let pool = app.app.storage.get_pool();

    sqlx::query("CREATE UNIQUE INDEX idx_users_device_id ON users (device_id)")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO users (username, password, role, device_id) VALUES ('legacy-login', 'x', 'device', 'dev-conflict')")
        .execute(pool)
        .await
        .unwrap();

    let result = app.app.registry.register("dev-conflict").await.unwrap();

    assert_eq!(result, Registration::Accepted);
    assert!(app.app.registry.is_known("dev-conflict").await);
    // The conflicting transaction is rolled back as a whole
    assert_eq!(app.count("users").await, 1);
    assert_eq!(app.count("devices").await, 0);
}

#[tokio::test]
async fn test_storage_failure_is_not_cached() {
    let app = MockApp::with_settings(|settings| settings.registry.window_secs = 0).await;

    sqlx::query("DROP TABLE devices")
        .execute(app.app.storage.get_pool())
        .await
        .unwrap();

    assert!(app.app.registry.register("dev-abc123").await.is_err());
    assert!(!app.app.registry.is_known("dev-abc123").await);
    // Rolled back with the failed device insert
    assert_eq!(app.count("users").await, 0);
}

#[tokio::test]
async fn test_throttle_counts_failed_attempts() {
    let app = MockApp::new().await;

    sqlx::query("DROP TABLE devices")
        .execute(app.app.storage.get_pool())
        .await
        .unwrap();

    assert!(app.app.registry.register("dev-abc123").await.is_err());
    assert_eq!(
        app.app.registry.register("dev-abc123").await.unwrap(),
        Registration::Suppressed
    );
}

#[tokio::test]
async fn test_device_login_is_never_stored_in_plaintext() {
    let app = MockApp::new().await;
    let pool = app.app.storage.get_pool();

    assert_eq!(app.app.registry.register("dev-login").await.unwrap(), Registration::Accepted);

    let (plaintext_matches,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1 AND password = $2")
            .bind("dev-login")
            .bind("123456")
            .fetch_one(pool)
            .await
            .unwrap();
    assert_eq!(plaintext_matches, 0);

    let (stored,): (String,) = sqlx::query_as("SELECT password FROM users WHERE username = $1")
        .bind("dev-login")
        .fetch_one(pool)
        .await
        .unwrap();
    assert!(stored.starts_with("$argon2"));
}

