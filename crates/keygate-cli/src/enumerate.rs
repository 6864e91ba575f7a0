//! Bounded device queries
//!
//! Device enumeration blocks on an external service. Queries run on the
//! blocking pool and are abandoned once the configured timeout elapses.

use std::time::Duration;

use keygate_core::{Error, Result};
use tracing::{debug, error};

/// Run a blocking device query, failing with `EnumerationTimeout` if it takes too long
pub async fn with_timeout<T, F>(timeout: Duration, query: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    debug!("Starting device query (timeout {:?})", timeout);

    let handle = tokio::task::spawn_blocking(query);

    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(Error::Enumeration(format!("device query aborted: {}", e))),
        Err(_) => {
            error!("Device query did not finish within {:?}", timeout);
            Err(Error::EnumerationTimeout {
                secs: timeout.as_secs(),
            })
        }
    }
}
