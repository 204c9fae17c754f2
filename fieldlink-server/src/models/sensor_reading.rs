use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::macros::format_description;

use super::{DeviceId, Table};

/// One stored telemetry message. Actuator channels keep the device wire names.
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct SensorReading {
    pub id: i64,
    pub device_id: String,
    /// Device reported time, or the receive time when the device sent none
    pub timestamp: Option<String>,
    /// Temperature in Celsius
    pub temperature_inside: Option<f64>,
    /// Temperature in Celsius
    pub temperature_outside: Option<f64>,
    /// Relative humidity %
    pub humidity: Option<f64>,
    #[serde(rename = "duoj1")]
    #[sqlx(rename = "duoj1")]
    pub servo_1: Option<i64>,
    #[serde(rename = "duoj2")]
    #[sqlx(rename = "duoj2")]
    pub servo_2: Option<i64>,
    #[serde(rename = "duoj3")]
    #[sqlx(rename = "duoj3")]
    pub servo_3: Option<i64>,
    #[serde(rename = "duoj4")]
    #[sqlx(rename = "duoj4")]
    pub servo_4: Option<i64>,
    #[serde(rename = "feng1")]
    #[sqlx(rename = "feng1")]
    pub fan_1: Option<i64>,
    #[serde(rename = "feng2")]
    #[sqlx(rename = "feng2")]
    pub fan_2: Option<i64>,
    #[serde(rename = "jia")]
    #[sqlx(rename = "jia")]
    pub heater: Option<i64>,
    /// The inbound payload text exactly as received
    pub raw_data: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A reading extracted from an inbound payload, not yet stored.
#[derive(Clone, Debug, PartialEq)]
pub struct NewSensorReading {
    pub device_id: String,
    pub timestamp: String,
    pub temperature_inside: Option<f64>,
    pub temperature_outside: Option<f64>,
    pub humidity: Option<f64>,
    pub servo_1: Option<i64>,
    pub servo_2: Option<i64>,
    pub servo_3: Option<i64>,
    pub servo_4: Option<i64>,
    pub fan_1: Option<i64>,
    pub fan_2: Option<i64>,
    pub heater: Option<i64>,
    pub raw_data: String,
    pub created_at: OffsetDateTime,
}

impl NewSensorReading {
    pub fn from_payload(
        device_id: &DeviceId,
        payload: &Map<String, Value>,
        raw: &str,
        received_at: OffsetDateTime,
    ) -> Self {
        let timestamp = match payload.get("timestamp") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => Self::format_timestamp(received_at),
            Some(other) => other.to_string(),
        };

        Self {
            device_id: device_id.to_string(),
            timestamp,
            temperature_inside: real(payload, "temperature_inside"),
            temperature_outside: real(payload, "temperature_outside"),
            humidity: real(payload, "humidity"),
            servo_1: integer(payload, "duoj1"),
            servo_2: integer(payload, "duoj2"),
            servo_3: integer(payload, "duoj3"),
            servo_4: integer(payload, "duoj4"),
            fan_1: integer(payload, "feng1"),
            fan_2: integer(payload, "feng2"),
            heater: integer(payload, "jia"),
            raw_data: raw.to_string(),
            created_at: received_at,
        }
    }

    /// `YYYY-MM-DD HH:MM:SS`, the layout devices use when they report time.
    pub fn format_timestamp(time: OffsetDateTime) -> String {
        time.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
            .unwrap_or_else(|_| time.unix_timestamp().to_string())
    }
}

fn real(payload: &Map<String, Value>, key: &str) -> Option<f64> {
    payload.get(key).and_then(Value::as_f64)
}

fn integer(payload: &Map<String, Value>, key: &str) -> Option<i64> {
    match payload.get(key)? {
        Value::Number(number) => number.as_i64().or_else(|| number.as_f64().map(|value| value.round() as i64)),
        Value::Bool(flag) => Some(i64::from(*flag)),
        _ => None,
    }
}

#[derive(Clone)]
pub struct SensorReadingTable;

impl Table for SensorReadingTable {
    fn name(&self) -> &'static str {
        "sensor_data"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS sensor_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                device_id TEXT NOT NULL,
                timestamp TEXT,
                temperature_inside REAL,
                temperature_outside REAL,
                humidity REAL,
                duoj1 INTEGER,
                duoj2 INTEGER,
                duoj3 INTEGER,
                duoj4 INTEGER,
                feng1 INTEGER,
                feng2 INTEGER,
                jia INTEGER,
                raw_data TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_sensor_data_device_created ON sensor_data (device_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_sensor_data_timestamp ON sensor_data (timestamp);
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS sensor_data;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use super::*;

    fn device() -> DeviceId {
        DeviceId::parse("dev-abc123").unwrap()
    }

    #[test]
    fn test_missing_channels_stay_absent() {
        let payload = json!({ "temperature_inside": 24.5, "humidity": 61.0 });
        let reading = NewSensorReading::from_payload(
            &device(),
            payload.as_object().unwrap(),
            &payload.to_string(),
            datetime!(2025-12-18 10:15:30 UTC),
        );

        assert_eq!(reading.temperature_inside, Some(24.5));
        assert_eq!(reading.humidity, Some(61.0));
        assert_eq!(reading.temperature_outside, None);
        assert_eq!(reading.servo_1, None);
        assert_eq!(reading.heater, None);
        assert_eq!(reading.timestamp, "2025-12-18 10:15:30");
    }

    #[test]
    fn test_actuator_channels_accept_numbers_and_flags() {
        let payload = json!({
            "timestamp": "2025-12-18T08:00:00",
            "duoj1": 90,
            "duoj2": 45.6,
            "feng1": true,
            "feng2": 0,
            "jia": "on"
        });
        let reading = NewSensorReading::from_payload(
            &device(),
            payload.as_object().unwrap(),
            &payload.to_string(),
            OffsetDateTime::now_utc(),
        );

        assert_eq!(reading.timestamp, "2025-12-18T08:00:00");
        assert_eq!(reading.servo_1, Some(90));
        assert_eq!(reading.servo_2, Some(46));
        assert_eq!(reading.fan_1, Some(1));
        assert_eq!(reading.fan_2, Some(0));
        assert_eq!(reading.heater, None);
    }

    #[test]
    fn test_raw_payload_is_kept_verbatim() {
        let raw = r#"{ "humidity": 55, "temperature_inside": 24.50, "extra": {"rssi": -71}, "pressure": 1.013e3 }"#;
        let payload: Map<String, Value> = serde_json::from_str(raw).unwrap();
        let reading = NewSensorReading::from_payload(&device(), &payload, raw, OffsetDateTime::now_utc());

        assert_eq!(reading.raw_data, raw);
        assert_eq!(reading.humidity, Some(55.0));
        assert_eq!(reading.temperature_inside, Some(24.5));
    }
}
