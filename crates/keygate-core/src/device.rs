//! Device records
//!
//! Device sources report devices as string-keyed attribute maps. The gate
//! works on [`DeviceRecord`], a typed snapshot with explicit optional fields.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};

/// Raw key/value attributes for one device, as returned by a device source
pub type AttributeMap = BTreeMap<String, String>;

/// Attribute key for the volume label
pub const VOLUME_NAME: &str = "VolumeName";

/// Attribute key for the volume serial number
pub const VOLUME_SERIAL_NUMBER: &str = "VolumeSerialNumber";

/// Attribute key for the OS device identifier (e.g. "/dev/sdb1")
pub const DEVICE_ID: &str = "DeviceID";

/// Attribute key for the filesystem type
pub const FILE_SYSTEM: &str = "FileSystem";

/// Read-only snapshot of one storage device at query time
///
/// Serializes to the same attribute names a device source reports, so a
/// serialized list can be read back by [`JsonFileSource`](crate::JsonFileSource).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceRecord {
    /// Volume label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_name: Option<String>,
    /// Volume serial number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_serial_number: Option<String>,
    /// OS device identifier
    #[serde(rename = "DeviceID", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Filesystem type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_system: Option<String>,
}

impl DeviceRecord {
    /// Build a record from the attributes reported by a device source.
    ///
    /// Empty values are treated as absent.
    pub fn from_attributes(attributes: &AttributeMap) -> Self {
        let get = |key: &str| {
            attributes
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
        };

        Self {
            volume_name: get(VOLUME_NAME),
            volume_serial_number: get(VOLUME_SERIAL_NUMBER),
            device_id: get(DEVICE_ID),
            file_system: get(FILE_SYSTEM),
        }
    }

    /// Check whether the volume label is exactly `label`
    pub fn has_label(&self, label: &str) -> bool {
        self.volume_name.as_deref() == Some(label)
    }

    /// The volume serial number, or `MissingAttribute` if the source did not report one
    pub fn serial(&self) -> Result<&str> {
        self.volume_serial_number
            .as_deref()
            .ok_or(Error::MissingAttribute(VOLUME_SERIAL_NUMBER))
    }

    /// Get a display-friendly description of the device
    pub fn display_name(&self) -> String {
        match (&self.device_id, &self.volume_name) {
            (Some(id), Some(label)) => format!("{} ({})", id, label),
            (Some(id), None) => id.clone(),
            (None, Some(label)) => label.clone(),
            (None, None) => "<unnamed device>".to_string(),
        }
    }
}
