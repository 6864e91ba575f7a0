//! Device lookup by volume label

use tracing::{debug, warn};

use crate::device::DeviceRecord;
use crate::error::{Error, Result};
use crate::source::DeviceSource;

/// One-shot iterator over the devices carrying a label at query time
pub type LabelMatches<R> = Box<dyn Iterator<Item = R> + Send>;

/// Locates storage devices by their volume label.
///
/// Every call issues a fresh query against the underlying device source.
/// "No such device" is an `Ok` absence; only a failing query is an error.
pub trait DeviceFinder {
    /// Record type produced for each device
    type Record;

    /// Devices whose label is exactly `label`, in enumeration order
    fn list_devices_with_label(&self, label: &str) -> Result<LabelMatches<Self::Record>>;

    /// First device whose label is exactly `label`
    ///
    /// Which device wins when several share a label depends on enumeration
    /// order and is not otherwise specified.
    fn find_device_by_label(&self, label: &str) -> Result<Option<Self::Record>> {
        Ok(self.list_devices_with_label(label)?.next())
    }

    /// Like [`find_device_by_label`](Self::find_device_by_label), with absence
    /// reported as `DeviceNotFound`
    fn require_device_by_label(&self, label: &str) -> Result<Self::Record> {
        self.find_device_by_label(label)?
            .ok_or_else(|| Error::DeviceNotFound(label.to_string()))
    }

    /// Whether [`find_device_by_label`](Self::find_device_by_label) finds a device
    fn has_device_named(&self, label: &str) -> Result<bool> {
        Ok(self.find_device_by_label(label)?.is_some())
    }

    /// Whether at least one device carries `label`
    fn has_devices_with_label(&self, label: &str) -> Result<bool> {
        Ok(self.list_devices_with_label(label)?.next().is_some())
    }
}

/// [`DeviceFinder`] over any [`DeviceSource`]
#[derive(Debug, Clone)]
pub struct LabelFinder<S> {
    source: S,
}

impl<S: DeviceSource> LabelFinder<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// The underlying device source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Every visible device, labelled or not
    pub fn list_devices(&self) -> Result<Vec<DeviceRecord>> {
        let devices = self
            .source
            .query()?
            .iter()
            .map(DeviceRecord::from_attributes)
            .collect::<Vec<_>>();

        debug!("Device query returned {} device(s)", devices.len());
        Ok(devices)
    }
}

impl<S: DeviceSource> DeviceFinder for LabelFinder<S> {
    type Record = DeviceRecord;

    fn list_devices_with_label(&self, label: &str) -> Result<LabelMatches<DeviceRecord>> {
        let label = label.to_string();
        let matches = self
            .list_devices()?
            .into_iter()
            .filter(move |device| device.has_label(&label));

        Ok(Box::new(matches))
    }

    fn find_device_by_label(&self, label: &str) -> Result<Option<DeviceRecord>> {
        let mut matches = self.list_devices_with_label(label)?;
        let first = matches.next();

        if first.is_some() {
            let others = matches.count();
            if others > 0 {
                warn!(
                    "{} devices carry label {:?}; using the first one enumerated",
                    others + 1,
                    label
                );
            }
        } else {
            debug!("No device with label {:?}", label);
        }

        Ok(first)
    }
}
