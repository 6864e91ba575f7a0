//! Error types for Keygate

use thiserror::Error;

/// Result type alias for gate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while locating or authenticating a device
#[derive(Debug, Error)]
pub enum Error {
    /// No device carries the requested label
    #[error("No device found with label: {0}")]
    DeviceNotFound(String),

    /// A device record lacks an attribute the check depends on
    #[error("Device record is missing attribute: {0}")]
    MissingAttribute(&'static str),

    /// The device-listing service failed
    #[error("Device enumeration failed: {0}")]
    Enumeration(String),

    /// The device-listing service did not answer in time
    #[error("Device enumeration timed out after {secs}s")]
    EnumerationTimeout { secs: u64 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The continuation failed to run
    #[error("Task failed: {0}")]
    Task(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
