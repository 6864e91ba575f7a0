//! Configuration lookup and command-line overrides

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use keygate_core::{GateConfig, SourceConfig};
use tracing::debug;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "KEYGATE_CONFIG";

/// Values given on the command line, applied over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub label: Option<String>,
    pub seed: Option<String>,
    pub devices_file: Option<PathBuf>,
}

impl Overrides {
    pub fn apply(&self, config: &mut GateConfig) {
        if let Some(label) = &self.label {
            config.label = label.clone();
        }
        if let Some(seed) = &self.seed {
            config.expected_seed = seed.clone();
        }
        if let Some(path) = &self.devices_file {
            config.source = SourceConfig::File { path: path.clone() };
        }
    }
}

/// Pick the config file: explicit flag, then `KEYGATE_CONFIG`, then the user config dir
pub fn config_path(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    config_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env_value.map(PathBuf::from))
        .or_else(|| {
            config_dir
                .filter(|dir| dir.is_absolute())
                .map(|dir| dir.join("keygate").join("config.json"))
        })
}

/// Load the gate configuration.
///
/// An explicitly requested file must exist; the default location may be
/// absent, in which case built-in defaults apply.
pub fn load_config(explicit: Option<&Path>, overrides: &Overrides) -> Result<GateConfig> {
    let path = config_path(explicit, std::env::var_os(CONFIG_ENV), dirs::config_dir());

    let mut config = match path {
        Some(path) if explicit.is_some() || path.exists() => {
            debug!("Loading config from {:?}", path);
            GateConfig::load(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        _ => {
            debug!("No config file, using defaults");
            GateConfig::default()
        }
    };

    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}
