use rand::Rng;
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::macros::format_description;

/// A full telemetry payload with every channel populated.
pub fn telemetry_payload<R: Rng>(rng: &mut R, now: OffsetDateTime) -> Value {
    json!({
        "timestamp": local_timestamp(now),
        // Celsius
        "temperature_inside": one_decimal(rng.random_range(20.0..30.0)),
        "temperature_outside": one_decimal(rng.random_range(15.0..25.0)),
        // Relative humidity %
        "humidity": one_decimal(rng.random_range(50.0..80.0)),
        // Servo positions
        "duoj1": rng.random_range(0..=100),
        "duoj2": rng.random_range(0..=100),
        "duoj3": rng.random_range(0..=100),
        "duoj4": rng.random_range(0..=100),
        // Fans and heater are on/off
        "feng1": rng.random_range(0..=1),
        "feng2": rng.random_range(0..=1),
        "jia": rng.random_range(0..=1),
    })
}

pub fn command_payload(command: &str, now: OffsetDateTime) -> Value {
    json!({
        "command": command,
        "params": {},
        "timestamp": local_timestamp(now),
    })
}

pub fn local_timestamp(now: OffsetDateTime) -> String {
    now.format(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
