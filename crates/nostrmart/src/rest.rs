//! RestClient: a [`Store`] backed by a PostgREST-style HTTP service.
//!
//! Tables live under `{base_url}/rest/v1/{table}`. Filters are query
//! parameters of the form `column=eq.value`; inserts ask for the stored rows
//! back with `Prefer: return=representation`.

use std::time::Duration;

use async_trait::async_trait;
use nostrmart_core::Event;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::store::{
    EventQuery, InsertResult, MediaObject, NewMediaObject, Result, Store, StoreError,
};

const EVENTS_TABLE: &str = "nostr_events";
const MEDIA_TABLE: &str = "media_objects";

/// Connection settings for the REST store.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Service root, without the `/rest/v1` suffix.
    pub base_url: String,
    /// Key sent as `apikey` and bearer token.
    pub api_key: String,
    /// Privileged key for media inserts, when the service requires one.
    pub service_key: Option<String>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Extra attempts after the first on transport errors and 5xx.
    pub retry_max: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub initial_backoff: Duration,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            service_key: None,
            connect_timeout: Duration::from_secs(1),
            read_timeout: Duration::from_secs(2),
            retry_max: 2,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

impl RestConfig {
    /// Config for a service root and key, other fields default.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

/// HTTP client for the backing store.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    endpoint: String,
    config: RestConfig,
}

impl RestClient {
    pub fn new(config: RestConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;
        let endpoint = format!("{}/rest/v1", config.base_url.trim_end_matches('/'));

        Ok(Self {
            http,
            endpoint,
            config,
        })
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Send one logical request, retrying transient failures.
    ///
    /// Client errors (4xx) are returned immediately.
    async fn send<T, B>(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, String)],
        body: Option<&B>,
        privileged: bool,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let url = format!("{}/{}", self.endpoint, table);
        let mut attempt = 0u32;

        loop {
            let request = self.request(method.clone(), &url, query, body, privileged);
            match self.attempt::<T>(request).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.config.retry_max => {
                    let delay = self.config.initial_backoff * 2u32.pow(attempt);
                    attempt += 1;
                    warn!(
                        method = %method,
                        table,
                        attempt,
                        error = %e,
                        "Store request failed, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if e.is_transient() => {
                    warn!(method = %method, table, attempts = attempt + 1, error = %e, "Store request failed");
                    return Err(e);
                }
                Err(e) => {
                    debug!(method = %method, table, error = %e, "Store rejected request");
                    return Err(e);
                }
            }
        }
    }

    fn request<B>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&B>,
        privileged: bool,
    ) -> RequestBuilder
    where
        B: Serialize + ?Sized,
    {
        let key = match (&self.config.service_key, privileged) {
            (Some(service_key), true) => service_key,
            _ => &self.config.api_key,
        };

        let mut request = self
            .http
            .request(method, url)
            .timeout(self.config.read_timeout)
            .header("apikey", key)
            .bearer_auth(key)
            .header("Prefer", "return=representation")
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }
        request
    }

    async fn attempt<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        self.send::<Vec<T>, ()>(Method::GET, table, query, None, false)
            .await
    }
}

fn page(limit: usize, offset: usize) -> [(&'static str, String); 3] {
    [
        ("limit", limit.to_string()),
        ("offset", offset.to_string()),
        ("order", "created_at.desc".to_string()),
    ]
}

#[async_trait]
impl Store for RestClient {
    async fn insert_event(&self, event: &Event) -> Result<InsertResult> {
        let result = self
            .send::<Vec<Event>, Event>(Method::POST, EVENTS_TABLE, &[], Some(event), false)
            .await;

        match result {
            Ok(_) => {
                debug!(id = %event.id, "Inserted event");
                Ok(InsertResult::Inserted)
            }
            // unique violation on the id column
            Err(StoreError::Status { status, .. }) if status == StatusCode::CONFLICT.as_u16() => {
                Ok(InsertResult::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>> {
        let rows: Vec<Event> = self
            .select(EVENTS_TABLE, &[("id", format!("eq.{}", id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>> {
        let mut params = page(query.limit, query.offset).to_vec();
        if let Some(pubkey) = &query.pubkey {
            params.push(("pubkey", format!("eq.{}", pubkey)));
        }
        if let Some(kind) = query.kind {
            params.push(("kind", format!("eq.{}", kind)));
        }
        self.select(EVENTS_TABLE, &params).await
    }

    async fn insert_media_object(&self, media: &NewMediaObject) -> Result<MediaObject> {
        let rows: Vec<MediaObject> = self
            .send(Method::POST, MEDIA_TABLE, &[], Some(media), true)
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".into()))
    }

    async fn get_media_object(&self, id: &str) -> Result<Option<MediaObject>> {
        let rows: Vec<MediaObject> = self
            .select(MEDIA_TABLE, &[("id", format!("eq.{}", id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list_media_by_uploader(
        &self,
        pubkey: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MediaObject>> {
        let mut params = page(limit, offset).to_vec();
        params.push(("uploader_pubkey", format!("eq.{}", pubkey)));
        self.select(MEDIA_TABLE, &params).await
    }
}
