//! Configuration loading from environment variables or a JSON document.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use nostrmart_auth::AuthenticatorConfig;
use nostrmart_blob::{BlobClientConfig, DEFAULT_SERVERS};
use nostrmart_core::DEFAULT_MAX_CONTENT_BYTES;
use serde::Deserialize;

use crate::events::EventServiceConfig;
use crate::media::MediaConfig;
use crate::rest::RestConfig;

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Blob servers in preference order.
    pub blob_servers: Vec<String>,
    /// Store connect timeout, in seconds.
    pub connect_timeout: f64,
    /// Store read timeout, in seconds.
    pub read_timeout: f64,
    /// Extra attempts for failed store requests.
    pub retry_max: u32,
    /// Largest accepted event content and media upload, in bytes.
    pub max_event_bytes: usize,
    /// Upper-cased level name, e.g. `INFO`.
    pub log_level: String,
    /// When set, only these media types may be uploaded.
    pub media_allowed_mime: Option<Vec<String>>,
    /// Backing store root URL.
    pub store_url: Option<String>,
    pub store_api_key: Option<String>,
    pub store_service_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            blob_servers: DEFAULT_SERVERS.iter().map(|s| s.to_string()).collect(),
            connect_timeout: 1.0,
            read_timeout: 2.0,
            retry_max: 2,
            max_event_bytes: DEFAULT_MAX_CONTENT_BYTES,
            log_level: "INFO".into(),
            media_allowed_mime: None,
            store_url: None,
            store_api_key: None,
            store_service_key: None,
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through `lookup`, which maps a variable name to its
    /// value. Unset and blank variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let mut blob_servers = var("BLOSSOM_SERVERS")
            .map(csv_strings)
            .unwrap_or(defaults.blob_servers);
        if let Some(endpoint) = var("BLOSSOM_ENDPOINT") {
            let endpoint = endpoint.trim().trim_end_matches('/').to_string();
            blob_servers.retain(|s| s.trim_end_matches('/') != endpoint);
            blob_servers.insert(0, endpoint);
        }

        let settings = Self {
            blob_servers,
            connect_timeout: parse_var(&var, "HTTP_CONNECT_TIMEOUT")?
                .unwrap_or(defaults.connect_timeout),
            read_timeout: parse_var(&var, "HTTP_READ_TIMEOUT")?.unwrap_or(defaults.read_timeout),
            retry_max: parse_var(&var, "HTTP_RETRY_MAX")?.unwrap_or(defaults.retry_max),
            max_event_bytes: parse_var(&var, "MAX_EVENT_BYTES")?
                .unwrap_or(defaults.max_event_bytes),
            log_level: var("LOG_LEVEL")
                .map(|l| l.trim().to_uppercase())
                .unwrap_or(defaults.log_level),
            media_allowed_mime: var("MEDIA_ALLOWED_MIME")
                .map(csv_strings)
                .filter(|v| !v.is_empty()),
            store_url: var("SUPABASE_URL").map(|s| s.trim().to_string()),
            store_api_key: var("SUPABASE_ANON_KEY"),
            store_service_key: var("SUPABASE_SERVICE_ROLE_KEY"),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON document. Missing fields keep their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json).context("parsing settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        if self.blob_servers.is_empty() {
            bail!("no blob servers configured");
        }
        seconds(self.connect_timeout).context("HTTP_CONNECT_TIMEOUT")?;
        seconds(self.read_timeout).context("HTTP_READ_TIMEOUT")?;
        if self.store_url.is_some() && self.store_api_key.is_none() {
            bail!("SUPABASE_URL is set but SUPABASE_ANON_KEY is missing");
        }
        Ok(())
    }

    /// Blob client configuration for the configured servers.
    pub fn blob_config(&self) -> BlobClientConfig {
        BlobClientConfig::with_servers(self.blob_servers.iter().cloned())
    }

    /// Store client configuration, if a store is configured.
    pub fn rest_config(&self) -> Result<Option<RestConfig>> {
        let Some(base_url) = &self.store_url else {
            return Ok(None);
        };
        let api_key = self
            .store_api_key
            .clone()
            .context("SUPABASE_ANON_KEY is missing")?;

        Ok(Some(RestConfig {
            base_url: base_url.clone(),
            api_key,
            service_key: self.store_service_key.clone(),
            connect_timeout: seconds(self.connect_timeout).context("connect timeout")?,
            read_timeout: seconds(self.read_timeout).context("read timeout")?,
            retry_max: self.retry_max,
            ..RestConfig::default()
        }))
    }

    pub fn event_config(&self) -> EventServiceConfig {
        EventServiceConfig {
            max_content_bytes: self.max_event_bytes,
        }
    }

    pub fn media_config(&self) -> MediaConfig {
        MediaConfig {
            max_file_size: self.max_event_bytes,
            allowed_mime: self.media_allowed_mime.clone(),
        }
    }

    pub fn auth_config(&self) -> AuthenticatorConfig {
        AuthenticatorConfig::default()
    }
}

fn parse_var<V, T>(var: &V, name: &str) -> Result<Option<T>>
where
    V: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(name)
        .map(|v| {
            v.trim()
                .parse::<T>()
                .with_context(|| format!("parsing {}={:?}", name, v))
        })
        .transpose()
}

fn seconds(value: f64) -> Result<Duration> {
    if value <= 0.0 {
        bail!("timeout must be positive, got {}", value);
    }
    Duration::try_from_secs_f64(value).with_context(|| format!("invalid timeout {}", value))
}

/// Split a comma-separated string into trimmed string values.
pub fn csv_strings(input: impl AsRef<str>) -> Vec<String> {
    input
        .as_ref()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
