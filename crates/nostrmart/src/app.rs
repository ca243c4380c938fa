//! NostrMart: the components wired together from [`Settings`].

use std::sync::Arc;

use anyhow::{Context, Result};
use nostrmart_auth::{Authenticator, MemoryChallengeStore};
use nostrmart_blob::BlobClient;
use nostrmart_core::{Event, PublicKey};
use tracing::info;

use crate::config::Settings;
use crate::events::EventService;
use crate::media::MediaService;
use crate::rest::RestClient;
use crate::store::Store;

/// Authenticator, event service and media service over one store.
pub struct NostrMart<S: Store> {
    auth: Authenticator<MemoryChallengeStore>,
    events: EventService<S>,
    media: MediaService<S>,
}

impl NostrMart<RestClient> {
    /// Connect to the store named in `settings`.
    pub fn connect(settings: &Settings) -> Result<Self> {
        let rest = settings
            .rest_config()?
            .context("SUPABASE_URL is not set")?;
        let store = RestClient::new(rest).context("building store client")?;
        Self::with_store(settings, store)
    }
}

impl<S: Store> NostrMart<S> {
    /// Build over an existing store.
    pub fn with_store(settings: &Settings, store: S) -> Result<Self> {
        let store = Arc::new(store);
        let blobs = BlobClient::new(settings.blob_config()).context("building blob client")?;

        info!(
            blob_servers = settings.blob_servers.len(),
            max_event_bytes = settings.max_event_bytes,
            "NostrMart ready"
        );
        Ok(Self {
            auth: Authenticator::with_config(MemoryChallengeStore::new(), settings.auth_config()),
            events: EventService::new(store.clone(), settings.event_config()),
            media: MediaService::new(blobs, settings.media_config()).with_store(store),
        })
    }

    pub fn auth(&self) -> &Authenticator<MemoryChallengeStore> {
        &self.auth
    }

    pub fn events(&self) -> &EventService<S> {
        &self.events
    }

    pub fn media(&self) -> &MediaService<S> {
        &self.media
    }

    /// Check a login answer for `session_key` and consume its challenge.
    ///
    /// Returns the key the client proved it holds.
    pub async fn login(&self, session_key: &str, event: &Event) -> crate::Result<PublicKey> {
        self.auth.validate_and_consume(session_key, event).await?;
        Ok(event.public_key()?)
    }
}
