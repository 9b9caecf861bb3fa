//! Error types for LightDrive

use thiserror::Error;

/// The main error type for LightDrive operations
#[derive(Debug, Error)]
pub enum LightDriveError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Not initialized: {0}")]
    NotInitialized(String),

    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Teardown interrupted: {0}")]
    TeardownInterrupted(String),

    #[error("State error: {0}")]
    State(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Rate report failed: {0}")]
    Report(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML serialization error: {0}")]
    TomlSer(String),
}

/// Result type alias for LightDrive operations
pub type Result<T> = std::result::Result<T, LightDriveError>;

impl LightDriveError {
    /// Shorthand for a state-layer failure with a formatted message
    pub fn state(msg: impl Into<String>) -> Self {
        LightDriveError::State(msg.into())
    }

    /// Configuration errors are fatal to the object that raised them
    pub fn is_config(&self) -> bool {
        matches!(self, LightDriveError::Config(_))
    }
}

impl From<toml::de::Error> for LightDriveError {
    fn from(err: toml::de::Error) -> Self {
        LightDriveError::TomlParse(err.to_string())
    }
}

impl From<toml::ser::Error> for LightDriveError {
    fn from(err: toml::ser::Error) -> Self {
        LightDriveError::TomlSer(err.to_string())
    }
}
