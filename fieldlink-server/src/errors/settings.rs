#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}
