//! Fingerprint validation

use tracing::debug;

use crate::device::DeviceRecord;
use crate::error::Result;
use crate::fingerprint::Fingerprint;

/// Decides whether a device record is the expected key device
pub trait Validator {
    /// Record type this validator inspects
    type Record;

    /// Check a record.
    ///
    /// Returns `Ok(false)` for a device that is not the key. A record that
    /// cannot be checked at all is an error, not a mismatch.
    fn check(&self, record: &Self::Record) -> Result<bool>;
}

/// Matches a device whose volume serial fingerprints to the same value as a seed
#[derive(Debug, Clone)]
pub struct SerialValidator {
    expected: Fingerprint,
}

impl SerialValidator {
    /// Create a validator expecting the device serial `seed`.
    ///
    /// The expected fingerprint is computed here, once.
    pub fn new(seed: &str) -> Self {
        Self {
            expected: Fingerprint::of(seed),
        }
    }

    /// Create a validator from an already computed fingerprint
    pub fn from_fingerprint(expected: Fingerprint) -> Self {
        Self { expected }
    }

    pub fn expected(&self) -> &Fingerprint {
        &self.expected
    }
}

impl Validator for SerialValidator {
    type Record = DeviceRecord;

    fn check(&self, record: &DeviceRecord) -> Result<bool> {
        let actual = Fingerprint::of(record.serial()?);
        let matched = actual == self.expected;

        debug!(
            "Fingerprint check for {}: {}",
            record.display_name(),
            if matched { "match" } else { "mismatch" }
        );

        Ok(matched)
    }
}
