//! Keygate CLI support
//!
//! Configuration lookup and the timeout wrapper around device queries used
//! by the `keygate` binary.

pub mod enumerate;
pub mod settings;

pub use enumerate::with_timeout;
pub use settings::{config_path, load_config, Overrides};
