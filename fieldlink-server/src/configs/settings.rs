use std::path::{Path, PathBuf};
use std::{env, io};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};

use crate::errors::SettingsError;

const DEFAULT_SETTINGS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../",
    "configs/default.toml"
));

const ENV_PREFIX: &str = "FIELDLINK";
const ENV_SEPARATOR: &str = "__";

/// Upper bound on `retention.days`, keeps the purge horizon representable.
pub const MAX_RETENTION_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gateway {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive_secs: u64,
    pub topic: GatewayTopic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayTopic {
    pub telemetry: String,
    pub command: String,
    pub confirmation: String,
}

impl Default for GatewayTopic {
    fn default() -> Self {
        Self {
            telemetry: String::from("telemetry"),
            command: String::from("command"),
            confirmation: String::from("confirmation"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub url: String,
    pub clean_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registry {
    /// Minimum gap between two registration attempts of one device
    pub window_secs: u64,
    /// Password provisioned for auto-registered device accounts
    pub default_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retention {
    pub days: i64,
    pub interval_secs: u64,
    pub image_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub server: Server,
    pub gateway: Gateway,
    pub database: Database,
    pub registry: Registry,
    pub retention: Retention,
}

impl Settings {
    pub fn new() -> Result<Self, SettingsError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_SETTINGS, FileFormat::Toml))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Self::environment(None));

        let mut settings = Self::build(builder)?;

        settings.retention.image_path = Self::normalize_path(&settings.retention.image_path)
            .map_err(|e| ConfigError::Message(e.to_string()))?
            .to_string_lossy()
            .to_string();

        Ok(settings)
    }

    /// Layer an optional overlay document and `FIELDLINK__SECTION__KEY` variables over the defaults.
    pub fn from_sources<I>(default: &str, overlay: Option<&str>, vars: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut builder = Config::builder().add_source(File::from_str(default, FileFormat::Toml));

        if let Some(overlay) = overlay {
            builder = builder.add_source(File::from_str(overlay, FileFormat::Toml));
        }

        Self::build(builder.add_source(Self::environment(Some(vars.into_iter().collect()))))
    }

    fn environment(vars: Option<Map<String, String>>) -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .source(vars)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        let settings: Self = builder.build()?.try_deserialize()?;

        if !(0..=MAX_RETENTION_DAYS).contains(&settings.retention.days) {
            return Err(SettingsError::Invalid(format!(
                "retention.days must be between 0 and {MAX_RETENTION_DAYS}, got {}",
                settings.retention.days
            )));
        }

        Ok(settings)
    }

    fn normalize_path(path: &str) -> io::Result<PathBuf> {
        let path_buf = PathBuf::from(path);

        Ok(if path_buf.is_absolute() {
            path_buf
        } else {
            env::current_dir()?.as_path().join(Path::new(path))
        })
    }
}
