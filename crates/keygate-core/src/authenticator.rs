//! The authentication gate
//!
//! An [`Authenticator`] pairs a [`Validator`] with the device record it was
//! handed at construction. Calling [`Authenticator::authenticate_then`]
//! checks that record once and runs the continuation only on a match.
//! The record is never re-queried, so repeated calls give the same answer.

use tracing::{error, info, warn};

use crate::error::Result;
use crate::task::Continuation;
use crate::validator::Validator;

/// Result of a single authentication attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The device matched and the continuation ran
    Authenticated,
    /// The device did not match; the continuation did not run
    Rejected,
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated)
    }
}

/// Gate that unlocks a continuation for the expected device
#[derive(Debug, Clone)]
pub struct Authenticator<V: Validator> {
    validator: V,
    record: V::Record,
}

impl<V: Validator> Authenticator<V> {
    pub fn new(validator: V, record: V::Record) -> Self {
        Self { validator, record }
    }

    /// The record bound at construction
    pub fn record(&self) -> &V::Record {
        &self.record
    }

    /// Check the bound record and run `task` if it passes.
    ///
    /// A rejection is logged before returning. Validator errors are logged
    /// and propagated; `task` does not run in either case.
    pub fn authenticate_then<T: Continuation>(&self, task: T) -> Result<AuthOutcome> {
        let matched = self.validator.check(&self.record).map_err(|e| {
            error!("Authentication could not be evaluated: {}", e);
            e
        })?;

        if matched {
            info!("Device authenticated");
            task.run();
            Ok(AuthOutcome::Authenticated)
        } else {
            warn!("Authentication rejected: device fingerprint does not match");
            Ok(AuthOutcome::Rejected)
        }
    }
}
