//! Device-listing services
//!
//! A [`DeviceSource`] answers "which storage devices are visible right now"
//! with one attribute map per device. Every call is a live query.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use crate::device::{AttributeMap, DEVICE_ID, FILE_SYSTEM, VOLUME_NAME, VOLUME_SERIAL_NUMBER};
use crate::error::{Error, Result};

/// Opaque device-listing service
pub trait DeviceSource: Send + Sync {
    /// List the attributes of every currently visible device
    fn query(&self) -> Result<Vec<AttributeMap>>;
}

impl<S: DeviceSource + ?Sized> DeviceSource for Box<S> {
    fn query(&self) -> Result<Vec<AttributeMap>> {
        (**self).query()
    }
}

/// Fixed in-memory device list
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    devices: Vec<AttributeMap>,
}

impl StaticSource {
    /// Create a source that always reports `devices`
    pub fn new(devices: Vec<AttributeMap>) -> Self {
        Self { devices }
    }
}

impl DeviceSource for StaticSource {
    fn query(&self) -> Result<Vec<AttributeMap>> {
        Ok(self.devices.clone())
    }
}

/// Device list read from a JSON file (an array of attribute maps)
///
/// The file is re-read on every query.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeviceSource for JsonFileSource {
    fn query(&self) -> Result<Vec<AttributeMap>> {
        debug!("Reading device list from {:?}", self.path);

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::Enumeration(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            Error::Enumeration(format!(
                "Failed to parse device list {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// JSON structure returned by lsblk
#[derive(Debug, Deserialize)]
struct LsblkOutput {
    blockdevices: Vec<LsblkDevice>,
}

/// Individual device in lsblk JSON output
#[derive(Debug, Deserialize)]
struct LsblkDevice {
    name: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    fstype: Option<String>,
    #[serde(default)]
    children: Option<Vec<LsblkDevice>>,
}

/// Block devices as reported by `lsblk` (Linux)
///
/// Volume serial numbers are derived from the filesystem UUID in the form
/// Windows reports them, see [`volume_serial_from_uuid`].
#[derive(Debug, Clone)]
pub struct LsblkSource {
    program: String,
}

impl Default for LsblkSource {
    fn default() -> Self {
        Self {
            program: "lsblk".to_string(),
        }
    }
}

impl LsblkSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable in place of `lsblk`
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DeviceSource for LsblkSource {
    fn query(&self) -> Result<Vec<AttributeMap>> {
        debug!("Querying block devices with {}", self.program);

        let output = Command::new(&self.program)
            .args(["-J", "-o", "NAME,PATH,LABEL,UUID,FSTYPE,TYPE"])
            .output()
            .map_err(|e| Error::Enumeration(format!("Failed to execute {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(Error::Enumeration(format!(
                "{} failed: {}",
                self.program,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_lsblk_output(&output.stdout)
    }
}

/// Parse `lsblk -J` output into attribute maps, flattening partitions
pub fn parse_lsblk_output(stdout: &[u8]) -> Result<Vec<AttributeMap>> {
    let parsed: LsblkOutput = serde_json::from_slice(stdout)
        .map_err(|e| Error::Enumeration(format!("Failed to parse lsblk output: {}", e)))?;

    let mut devices = Vec::new();
    let mut pending: Vec<LsblkDevice> = parsed.blockdevices;
    pending.reverse();

    // Depth-first so partitions follow their parent disk
    while let Some(mut dev) = pending.pop() {
        if let Some(mut children) = dev.children.take() {
            children.reverse();
            pending.extend(children);
        }
        devices.push(lsblk_attributes(dev));
    }

    Ok(devices)
}

fn lsblk_attributes(dev: LsblkDevice) -> AttributeMap {
    let mut attributes = AttributeMap::new();

    let device_id = dev.path.unwrap_or_else(|| format!("/dev/{}", dev.name));
    attributes.insert(DEVICE_ID.to_string(), device_id);

    if let Some(serial) = dev
        .uuid
        .as_deref()
        .and_then(|uuid| volume_serial_from_uuid(dev.fstype.as_deref(), uuid))
    {
        attributes.insert(VOLUME_SERIAL_NUMBER.to_string(), serial);
    }
    if let Some(label) = dev.label {
        attributes.insert(VOLUME_NAME.to_string(), label);
    }
    if let Some(fstype) = dev.fstype {
        attributes.insert(FILE_SYSTEM.to_string(), fstype);
    }

    attributes
}

/// Convert a filesystem UUID into a Windows-style volume serial number.
///
/// FAT and exFAT UUIDs (`42E7-D729`) lose the dash; NTFS serials keep their
/// low 32 bits. Other filesystems have no volume serial.
pub fn volume_serial_from_uuid(fstype: Option<&str>, uuid: &str) -> Option<String> {
    let serial = match fstype? {
        "vfat" | "exfat" => uuid.replace('-', ""),
        "ntfs" => uuid.get(uuid.len().saturating_sub(8)..)?.to_string(),
        _ => return None,
    };

    if serial.len() == 8 && serial.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(serial.to_ascii_uppercase())
    } else {
        None
    }
}
