//! Fan-out strategies over the ordered server list.
//!
//! Both strategies make a single pass with no backoff. Per-server failures
//! are logged and absorbed here.

use std::future::Future;

use tracing::{debug, error, warn};

use crate::error::{AttemptError, BlobError};

/// Try servers in order and return the first success with its server.
///
/// Fails with [`BlobError::AllServersUnreachable`] once every server has
/// failed, or if there are no servers.
pub async fn first_wins<'a, T, F, Fut>(
    operation: &'static str,
    servers: &'a [String],
    mut attempt: F,
) -> Result<(T, &'a str), BlobError>
where
    F: FnMut(&'a str) -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    for server in servers {
        debug!(operation, server = %server, "Attempting");
        match attempt(server).await {
            Ok(value) => {
                debug!(operation, server = %server, "Succeeded");
                return Ok((value, server));
            }
            Err(e) => warn!(operation, server = %server, error = %e, "Server attempt failed"),
        }
    }

    error!(operation, attempts = servers.len(), "All servers failed");
    Err(BlobError::AllServersUnreachable {
        operation,
        attempts: servers.len(),
    })
}

/// Run the operation against every server and keep the successes, in
/// server order.
pub async fn collect_all<'a, T, F, Fut>(
    operation: &'static str,
    servers: &'a [String],
    mut attempt: F,
) -> Vec<(&'a str, T)>
where
    F: FnMut(&'a str) -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let mut successes = Vec::with_capacity(servers.len());
    for server in servers {
        debug!(operation, server = %server, "Attempting");
        match attempt(server).await {
            Ok(value) => successes.push((server.as_str(), value)),
            Err(e) => warn!(operation, server = %server, error = %e, "Server attempt failed"),
        }
    }

    if successes.is_empty() && !servers.is_empty() {
        error!(operation, attempts = servers.len(), "All servers failed");
    }
    successes
}
