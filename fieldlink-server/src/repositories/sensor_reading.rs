use std::sync::Arc;

use sqlx::{Error, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::{NewSensorReading, SensorReading};

pub struct SensorReadingRepository {
    storage: Arc<Storage>,
}

impl SensorReadingRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl SensorReadingRepository {
    // Append one reading
    pub async fn create(
        &self,
        item: &NewSensorReading,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<SensorReading, Error> {
        let reading: SensorReading = sqlx::query_as(
            r#"
            INSERT INTO sensor_data (
                device_id, timestamp, temperature_inside, temperature_outside, humidity,
                duoj1, duoj2, duoj3, duoj4, feng1, feng2, jia, raw_data, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(&item.device_id)
        .bind(&item.timestamp)
        .bind(item.temperature_inside)
        .bind(item.temperature_outside)
        .bind(item.humidity)
        .bind(item.servo_1)
        .bind(item.servo_2)
        .bind(item.servo_3)
        .bind(item.servo_4)
        .bind(item.fan_1)
        .bind(item.fan_2)
        .bind(item.heater)
        .bind(&item.raw_data)
        .bind(item.created_at)
        .fetch_one(&mut **transaction)
        .await?;

        Ok(reading)
    }

    // Latest N readings, newest first; all devices when `device_id` is None
    pub async fn find_latest(
        &self,
        device_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<SensorReading>, Error> {
        let readings: Vec<SensorReading> = sqlx::query_as(
            r#"
            SELECT * FROM sensor_data
            WHERE $1 IS NULL OR device_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(device_id)
        .bind(limit)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(readings)
    }

    // Delete readings reported before `cutoff`, compared as text
    pub async fn delete_reported_before(
        &self,
        cutoff: &str,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM sensor_data WHERE timestamp < $1")
            .bind(cutoff)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}
