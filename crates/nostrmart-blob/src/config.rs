//! Blob client configuration.

use std::time::Duration;

/// Default public blob servers, tried in this order.
pub const DEFAULT_SERVERS: &[&str] = &[
    "https://blossom.primal.net",
    "https://blossom.band",
    "https://nostr.media",
];

/// Configuration for [`crate::BlobClient`].
#[derive(Debug, Clone)]
pub struct BlobClientConfig {
    /// Server base URLs, in preference order.
    pub servers: Vec<String>,
    /// TCP connect timeout, separate from the request timeouts.
    pub connect_timeout: Duration,
    /// Total timeout for upload, fetch, list and delete requests.
    pub transfer_timeout: Duration,
    /// Total timeout for existence and server-info requests.
    pub head_timeout: Duration,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for BlobClientConfig {
    fn default() -> Self {
        Self {
            servers: DEFAULT_SERVERS.iter().map(|s| s.to_string()).collect(),
            connect_timeout: Duration::from_secs(2),
            transfer_timeout: Duration::from_secs(30),
            head_timeout: Duration::from_secs(10),
            user_agent: concat!("NostrMart/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl BlobClientConfig {
    /// Default timeouts with a custom server list.
    pub fn with_servers<I, S>(servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            servers: servers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}
