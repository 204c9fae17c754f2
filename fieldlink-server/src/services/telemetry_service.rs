use std::sync::Arc;

use crate::configs::Storage;
use crate::errors::TelemetryError;
use crate::models::{DeviceId, NewSensorReading, SensorReading};
use crate::repositories::SensorReadingRepository;

pub struct TelemetryService {
    storage: Arc<Storage>,
    repository: SensorReadingRepository,
}

impl TelemetryService {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            repository: SensorReadingRepository::new(storage.clone()),
            storage,
        }
    }

    pub async fn save(&self, reading: &NewSensorReading) -> Result<SensorReading, TelemetryError> {
        let mut transaction = self.storage.get_pool().begin().await?;
        let saved = self.repository.create(reading, &mut transaction).await?;
        transaction.commit().await?;

        tracing::debug!(device_id = %saved.device_id, id = saved.id, "Stored sensor reading");

        Ok(saved)
    }

    /// Newest readings first, for one device or across all of them.
    pub async fn recent(
        &self,
        device_id: Option<&DeviceId>,
        limit: i64,
    ) -> Result<Vec<SensorReading>, TelemetryError> {
        Ok(self
            .repository
            .find_latest(device_id.map(DeviceId::as_str), limit)
            .await?)
    }

    pub async fn purge_reported_before(&self, cutoff: &str) -> Result<u64, TelemetryError> {
        let mut transaction = self.storage.get_pool().begin().await?;
        let deleted = self.repository.delete_reported_before(cutoff, &mut transaction).await?;
        transaction.commit().await?;

        Ok(deleted)
    }
}
