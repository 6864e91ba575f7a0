//! Gate configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::source::{DeviceSource, JsonFileSource, LsblkSource};

/// Label the key device is expected to carry
pub const DEFAULT_LABEL: &str = "TESTDISK";

/// Serial number of the key device
pub const DEFAULT_EXPECTED_SEED: &str = "42E7D729";

/// Where device records come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Query block devices with lsblk
    Lsblk,
    /// Read a JSON array of attribute maps from a file
    File { path: PathBuf },
}

/// Gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Volume label of the key device
    pub label: String,

    /// Seed whose fingerprint the device serial must match
    pub expected_seed: String,

    /// Device source
    pub source: SourceConfig,

    /// Timeout for a device query (seconds)
    pub enumeration_timeout_secs: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            expected_seed: DEFAULT_EXPECTED_SEED.to_string(),
            source: SourceConfig::Lsblk,
            enumeration_timeout_secs: 10,
        }
    }
}

impl GateConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the gate cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.label.is_empty() {
            return Err(crate::Error::Config("label must not be empty".to_string()));
        }
        if self.enumeration_timeout_secs == 0 {
            return Err(crate::Error::Config(
                "enumeration_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the configured device source
    pub fn device_source(&self) -> Box<dyn DeviceSource> {
        match &self.source {
            SourceConfig::Lsblk => Box::new(LsblkSource::new()),
            SourceConfig::File { path } => Box::new(JsonFileSource::new(path.clone())),
        }
    }
}
