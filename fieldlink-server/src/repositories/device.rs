use std::sync::Arc;

use sqlx::{Error, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::Device;

pub struct DeviceRepository {
    storage: Arc<Storage>,
}

impl DeviceRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl DeviceRepository {
    pub async fn create(
        &self,
        item: &Device,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO devices (device_id, name, status, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&item.device_id)
        .bind(&item.name)
        .bind(&item.status)
        .bind(item.created_at)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    pub async fn exists(
        &self,
        device_id: &str,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<bool, Error> {
        let found: Option<(String,)> = sqlx::query_as("SELECT device_id FROM devices WHERE device_id = $1")
            .bind(device_id)
            .fetch_optional(&mut **transaction)
            .await?;

        Ok(found.is_some())
    }

    pub async fn find_by_device_id(&self, device_id: &str) -> Result<Option<Device>, Error> {
        let device: Option<Device> = sqlx::query_as("SELECT * FROM devices WHERE device_id = $1")
            .bind(device_id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(device)
    }

    pub async fn find_all(&self) -> Result<Vec<Device>, Error> {
        let devices: Vec<Device> = sqlx::query_as("SELECT * FROM devices ORDER BY created_at")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(devices)
    }
}
