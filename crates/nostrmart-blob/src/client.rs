//! BlobClient: publishes and retrieves content-addressed blobs across an
//! ordered set of independent servers.

use bytes::Bytes;
use nostrmart_core::{sha256_hex, unix_now, Event};
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::authorization_header;
use crate::config::BlobClientConfig;
use crate::descriptor::{default_blob_url, is_sha256_hex, BlobDescriptor, ServerBlob, ServerInfo};
use crate::error::{AttemptError, BlobError, Result};
use crate::strategy::{collect_all, first_wins};

/// Fallback MIME type for uploads without one.
const OCTET_STREAM: &str = "application/octet-stream";

/// Client for a redundant set of blob servers.
#[derive(Debug, Clone)]
pub struct BlobClient {
    http: Client,
    servers: Vec<String>,
    config: BlobClientConfig,
}

impl BlobClient {
    /// Build a client. Server URLs must be absolute `http` or `https` URLs.
    pub fn new(config: BlobClientConfig) -> Result<Self> {
        let servers = config
            .servers
            .iter()
            .map(|s| normalize_server(s))
            .collect::<Result<Vec<_>>>()?;

        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            servers,
            config,
        })
    }

    /// Server base URLs in preference order, without trailing slashes.
    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    /// Get the configuration.
    pub fn config(&self) -> &BlobClientConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // First-wins operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Upload bytes to the first server that accepts them.
    ///
    /// The hash is computed locally before any request. Uploading bytes a
    /// server already holds is success.
    pub async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        auth_event: &Event,
        content_type: Option<&str>,
    ) -> Result<BlobDescriptor> {
        let sha256 = sha256_hex(&data);
        let mime = content_type.unwrap_or(OCTET_STREAM);
        // Validate before touching the network
        Part::bytes(Vec::new())
            .mime_str(mime)
            .map_err(|_| BlobError::MalformedInput(format!("invalid content type: {}", mime)))?;
        let auth = authorization_header(auth_event)?;

        let (descriptor, _) = first_wins("upload", &self.servers, |server| {
            self.try_upload(server, data.clone(), filename, mime, &auth, &sha256)
        })
        .await?;

        let descriptor = BlobDescriptor {
            mime_type: content_type.map(str::to_string),
            ..descriptor
        };
        info!(
            sha256 = %descriptor.sha256,
            server = %descriptor.source_server,
            size = descriptor.size_bytes,
            "Uploaded blob"
        );
        Ok(descriptor)
    }

    /// Fetch a blob by hash, verifying the returned bytes.
    ///
    /// A server that answers with bytes of a different hash counts as a
    /// failed attempt and the next server is tried.
    pub async fn fetch(&self, sha256: &str) -> Result<Bytes> {
        let sha256 = validate_hash(sha256)?;
        let (bytes, server) = first_wins("fetch", &self.servers, |server| {
            self.try_fetch(server, &sha256)
        })
        .await?;

        debug!(sha256 = %sha256, server = %server, size = bytes.len(), "Fetched blob");
        Ok(bytes)
    }

    /// Check whether any server holds the blob. Returns the first that does.
    pub async fn exists(&self, sha256: &str) -> Result<(bool, Option<String>)> {
        let sha256 = validate_hash(sha256)?;
        match first_wins("exists", &self.servers, |server| {
            self.try_head(server, &sha256)
        })
        .await
        {
            Ok(((), server)) => Ok((true, Some(server.to_string()))),
            Err(BlobError::AllServersUnreachable { .. }) => Ok((false, None)),
            Err(e) => Err(e),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Collect-all operations
    // ─────────────────────────────────────────────────────────────────────────

    /// List blobs owned by `pubkey` across all servers.
    ///
    /// Results are unioned in server order and deduplicated by hash, keeping
    /// the first occurrence. Unreachable servers contribute nothing.
    pub async fn list_by_owner(
        &self,
        pubkey: &str,
        auth_event: Option<&Event>,
    ) -> Result<Vec<BlobDescriptor>> {
        if !nostrmart_core::is_valid_hex_pubkey(pubkey) {
            return Err(BlobError::MalformedInput(format!(
                "invalid public key: {}",
                pubkey
            )));
        }
        let auth = auth_event.map(authorization_header).transpose()?;

        let per_server = collect_all("list", &self.servers, |server| {
            self.try_list(server, pubkey, auth.as_deref())
        })
        .await;

        let mut seen = std::collections::HashSet::new();
        let blobs: Vec<BlobDescriptor> = per_server
            .into_iter()
            .flat_map(|(_, blobs)| blobs)
            .filter(|b| seen.insert(b.sha256.clone()))
            .collect();

        debug!(pubkey, count = blobs.len(), "Listed blobs");
        Ok(blobs)
    }

    /// Delete a blob from every server.
    ///
    /// 200, 204 and 404 all count as success, so deleting an absent blob
    /// succeeds. Returns `true` if at least one server succeeded.
    pub async fn delete(&self, sha256: &str, auth_event: &Event) -> Result<bool> {
        let sha256 = validate_hash(sha256)?;
        let auth = authorization_header(auth_event)?;

        let successes = collect_all("delete", &self.servers, |server| {
            self.try_delete(server, &sha256, &auth)
        })
        .await;

        info!(sha256 = %sha256, servers = successes.len(), "Deleted blob");
        Ok(!successes.is_empty())
    }

    /// Ask a server's upload endpoint for its advertised limits.
    ///
    /// Never fails: an unreachable server reports `available: false`.
    pub async fn server_info(&self, server: &str) -> ServerInfo {
        let base = server.trim_end_matches('/');
        let response = self
            .http
            .head(format!("{}/upload", base))
            .timeout(self.config.head_timeout)
            .send()
            .await;

        match response {
            Ok(response) => parse_server_info(base, response.status(), response.headers()),
            Err(e) => {
                warn!(server = %base, error = %e, "Server info request failed");
                ServerInfo::unavailable(base)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Single-server attempts
    // ─────────────────────────────────────────────────────────────────────────

    async fn try_upload(
        &self,
        server: &str,
        data: Bytes,
        filename: &str,
        mime: &str,
        auth: &str,
        sha256: &str,
    ) -> std::result::Result<BlobDescriptor, AttemptError> {
        let size = data.len() as u64;
        let part = Part::stream_with_length(Body::from(data), size)
            .file_name(filename.to_string())
            .mime_str(mime)?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .put(format!("{}/upload", server))
            .header(AUTHORIZATION, auth)
            .multipart(form)
            .timeout(self.config.transfer_timeout)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(AttemptError::Status(response.status()));
        }

        let body = response.bytes().await?;
        let reported: ServerBlob = serde_json::from_slice(&body).unwrap_or_default();

        if let Some(actual) = &reported.sha256 {
            if !actual.eq_ignore_ascii_case(sha256) {
                return Err(AttemptError::IntegrityMismatch {
                    expected: sha256.to_string(),
                    actual: actual.clone(),
                });
            }
        }

        Ok(BlobDescriptor {
            sha256: sha256.to_string(),
            size_bytes: size,
            mime_type: None,
            source_server: server.to_string(),
            uploaded_at: unix_now(),
            url: reported
                .url
                .unwrap_or_else(|| default_blob_url(server, sha256)),
        })
    }

    async fn try_fetch(
        &self,
        server: &str,
        sha256: &str,
    ) -> std::result::Result<Bytes, AttemptError> {
        let response = self
            .http
            .get(default_blob_url(server, sha256))
            .timeout(self.config.transfer_timeout)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(AttemptError::Status(response.status()));
        }

        let bytes = response.bytes().await?;
        let actual = sha256_hex(&bytes);
        if actual != sha256 {
            return Err(AttemptError::IntegrityMismatch {
                expected: sha256.to_string(),
                actual,
            });
        }
        Ok(bytes)
    }

    async fn try_head(&self, server: &str, sha256: &str) -> std::result::Result<(), AttemptError> {
        let response = self
            .http
            .head(default_blob_url(server, sha256))
            .timeout(self.config.head_timeout)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(AttemptError::Status(status)),
        }
    }

    async fn try_list(
        &self,
        server: &str,
        pubkey: &str,
        auth: Option<&str>,
    ) -> std::result::Result<Vec<BlobDescriptor>, AttemptError> {
        let mut request = self
            .http
            .get(format!("{}/list/{}", server, pubkey))
            .timeout(self.config.transfer_timeout);
        if let Some(auth) = auth {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        if response.status() != StatusCode::OK {
            return Err(AttemptError::Status(response.status()));
        }

        let body = response.bytes().await?;
        let entries: Vec<ServerBlob> = serde_json::from_slice(&body)
            .map_err(|e| AttemptError::InvalidResponse(e.to_string()))?;

        Ok(entries
            .into_iter()
            .filter_map(|entry| entry.into_descriptor(server))
            .collect())
    }

    async fn try_delete(
        &self,
        server: &str,
        sha256: &str,
        auth: &str,
    ) -> std::result::Result<(), AttemptError> {
        let response = self
            .http
            .delete(default_blob_url(server, sha256))
            .header(AUTHORIZATION, auth)
            .timeout(self.config.transfer_timeout)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(()),
            status => Err(AttemptError::Status(status)),
        }
    }
}

/// Check a base URL and strip its trailing slash.
fn normalize_server(server: &str) -> Result<String> {
    let url = Url::parse(server)
        .map_err(|e| BlobError::MalformedInput(format!("invalid server url {}: {}", server, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(server.trim_end_matches('/').to_string()),
        scheme => Err(BlobError::MalformedInput(format!(
            "unsupported scheme {} in {}",
            scheme, server
        ))),
    }
}

/// Check a blob hash and lowercase it.
fn validate_hash(sha256: &str) -> Result<String> {
    if !is_sha256_hex(sha256) {
        return Err(BlobError::MalformedInput(format!(
            "invalid sha256: {}",
            sha256
        )));
    }
    Ok(sha256.to_ascii_lowercase())
}

fn parse_server_info(server: &str, status: StatusCode, headers: &HeaderMap) -> ServerInfo {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    ServerInfo {
        server: server.to_string(),
        available: status != StatusCode::NOT_FOUND,
        max_file_size: header("x-max-file-size").and_then(|v| v.trim().parse().ok()),
        supported_types: header("x-supported-types")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    }
}
