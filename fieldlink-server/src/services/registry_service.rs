use std::collections::HashSet;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::configs::Storage;
use crate::errors::RegistryError;
use crate::models::{Device, DeviceId, Role, User};
use crate::repositories::{DeviceRepository, UserRepository};
use crate::services::{AuthService, RateLimiter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The device is known, either cached or provisioned by this call.
    Accepted,
    /// Another attempt for this device happened within the throttle window.
    Suppressed,
    /// The identifier is not a valid device identifier.
    Rejected,
}

/// Provisions a device record and a login for every device seen on the wire.
pub struct DeviceRegistry {
    storage: Arc<Storage>,
    user_repository: UserRepository,
    device_repository: DeviceRepository,
    auth_service: Arc<AuthService>,
    rate_limiter: Arc<dyn RateLimiter>,
    known: Mutex<HashSet<String>>,
    default_password: String,
}

impl DeviceRegistry {
    pub fn new(
        storage: Arc<Storage>,
        auth_service: Arc<AuthService>,
        rate_limiter: Arc<dyn RateLimiter>,
        default_password: String,
    ) -> Self {
        Self {
            user_repository: UserRepository::new(storage.clone()),
            device_repository: DeviceRepository::new(storage.clone()),
            storage,
            auth_service,
            rate_limiter,
            known: Mutex::new(HashSet::new()),
            default_password,
        }
    }

    pub async fn register(&self, raw_device_id: &str) -> Result<Registration, RegistryError> {
        let Some(device_id) = DeviceId::parse(raw_device_id) else {
            tracing::warn!(device_id = raw_device_id, "Rejected invalid device identifier");
            return Ok(Registration::Rejected);
        };

        if !self.rate_limiter.try_acquire(&device_id).await {
            tracing::debug!(device_id = %device_id, "Registration suppressed");
            return Ok(Registration::Suppressed);
        }

        if self.known.lock().await.contains(device_id.as_str()) {
            return Ok(Registration::Accepted);
        }

        match self.provision(&device_id).await {
            Ok(()) => {}
            Err(RegistryError::Database(sqlx::Error::Database(e))) if e.is_unique_violation() => {
                tracing::info!(device_id = %device_id, "Device registered concurrently, treating as registered");
            }
            Err(e) => {
                tracing::error!(device_id = %device_id, "Device registration failed: {}", e);
                return Err(e);
            }
        }

        self.known.lock().await.insert(device_id.to_string());

        Ok(Registration::Accepted)
    }

    pub async fn is_known(&self, device_id: &str) -> bool {
        self.known.lock().await.contains(device_id)
    }

    async fn provision(&self, device_id: &DeviceId) -> Result<(), RegistryError> {
        let mut transaction = self.storage.get_pool().begin().await?;

        if !self.user_repository.exists(device_id, &mut transaction).await? {
            let password = self
                .auth_service
                .hash(&self.default_password)
                .map_err(|e| RegistryError::Credential(e.to_string()))?;

            let user = User {
                id: 0,
                username: device_id.to_string(),
                password,
                role: Role::Device.to_string(),
                device_id: Some(device_id.to_string()),
                created_at: OffsetDateTime::now_utc(),
            };

            self.user_repository.create(&user, &mut transaction).await?;
            tracing::info!(device_id = %device_id, "Created device login");
        }

        if !self.device_repository.exists(device_id, &mut transaction).await? {
            self.device_repository
                .create(&Device::provisioned(device_id), &mut transaction)
                .await?;
            tracing::info!(device_id = %device_id, "Created device record");
        }

        transaction.commit().await?;

        Ok(())
    }
}
