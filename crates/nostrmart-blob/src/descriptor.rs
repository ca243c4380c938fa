//! Blob descriptors and server metadata.

use serde::{Deserialize, Serialize};

/// Metadata for one stored blob. Identified solely by `sha256`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobDescriptor {
    /// Lowercase hex SHA-256 of the blob bytes.
    pub sha256: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// Base URL of the server that holds this copy.
    pub source_server: String,
    /// Unix seconds of upload.
    pub uploaded_at: u64,
    /// Retrieval URL reported by the server.
    pub url: String,
}

/// Blob entry as returned by a server's upload and list endpoints.
///
/// Servers disagree on which fields they fill in, so everything is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ServerBlob {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub uploaded: Option<u64>,
}

impl ServerBlob {
    /// Convert to a descriptor, or `None` if the entry has no usable hash.
    pub fn into_descriptor(self, server: &str) -> Option<BlobDescriptor> {
        let sha256 = self.sha256.filter(|h| is_sha256_hex(h))?.to_ascii_lowercase();
        Some(BlobDescriptor {
            url: self
                .url
                .unwrap_or_else(|| default_blob_url(server, &sha256)),
            size_bytes: self.size.unwrap_or_default(),
            mime_type: self.mime_type,
            source_server: server.to_string(),
            uploaded_at: self.uploaded.unwrap_or_default(),
            sha256,
        })
    }
}

/// What a server advertises about its upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    pub server: String,
    pub available: bool,
    pub max_file_size: Option<u64>,
    pub supported_types: Vec<String>,
}

impl ServerInfo {
    pub(crate) fn unavailable(server: &str) -> Self {
        Self {
            server: server.to_string(),
            available: false,
            max_file_size: None,
            supported_types: Vec::new(),
        }
    }
}

/// `{server}/{sha256}`.
pub fn default_blob_url(server: &str, sha256: &str) -> String {
    format!("{}/{}", server.trim_end_matches('/'), sha256)
}

/// Whether `s` is 64 hex characters.
pub fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}
