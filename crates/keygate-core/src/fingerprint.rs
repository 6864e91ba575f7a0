//! Serial number fingerprints
//!
//! A fingerprint is the MD5 digest of a string rendered as uppercase hex
//! with no separators. Seeds and device serials go through the same
//! encoding path so that comparison is a plain byte comparison.

use std::fmt;

use md5::{Digest, Md5};

/// Length of an encoded fingerprint in characters
pub const FINGERPRINT_HEX_LEN: usize = 32;

/// Hex-encoded digest of a serial number or seed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of an arbitrary string
    pub fn of(value: &str) -> Self {
        let digest = Md5::digest(value.as_bytes());
        Self(hex::encode_upper(digest))
    }

    /// The encoded form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
