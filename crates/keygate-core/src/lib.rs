//! Keygate Core - Hardware-bound authentication gate
//!
//! Locates a storage device by volume label, fingerprints its volume serial
//! number and runs a continuation only when the fingerprint matches the
//! expected one.
//!
//! Pipeline: [`LabelFinder`] -> [`DeviceRecord`] -> [`Authenticator`]
//! (holding a [`SerialValidator`]) -> [`Continuation`].

pub mod authenticator;
pub mod config;
pub mod device;
pub mod error;
pub mod finder;
pub mod fingerprint;
pub mod source;
pub mod task;
pub mod validator;

pub use authenticator::{AuthOutcome, Authenticator};
pub use config::{GateConfig, SourceConfig, DEFAULT_EXPECTED_SEED, DEFAULT_LABEL};
pub use device::{AttributeMap, DeviceRecord, VOLUME_NAME, VOLUME_SERIAL_NUMBER};
pub use error::{Error, Result};
pub use finder::{DeviceFinder, LabelFinder, LabelMatches};
pub use fingerprint::Fingerprint;
pub use source::{DeviceSource, JsonFileSource, LsblkSource, StaticSource};
pub use task::{CommandTask, Continuation};
pub use validator::{SerialValidator, Validator};
