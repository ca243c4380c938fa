//! EventService: verified ingest and lookup of Nostr events.

use std::sync::Arc;

use nostrmart_core::{unix_now, verify_event_detailed, Event, EventId, DEFAULT_MAX_CONTENT_BYTES};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::store::{EventQuery, InsertResult, Store};

/// Configuration for the event service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventServiceConfig {
    /// Largest accepted `content`, in bytes.
    pub max_content_bytes: usize,
}

impl Default for EventServiceConfig {
    fn default() -> Self {
        Self {
            max_content_bytes: DEFAULT_MAX_CONTENT_BYTES,
        }
    }
}

/// Result of ingesting an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    /// The event was new and has been stored.
    Stored(EventId),
    /// An event with this id was already stored.
    Duplicate(EventId),
}

impl Ingested {
    pub fn id(&self) -> EventId {
        match self {
            Ingested::Stored(id) | Ingested::Duplicate(id) => *id,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Ingested::Stored(_))
    }
}

/// Accepts events into the store after verifying them.
pub struct EventService<S: Store> {
    store: Arc<S>,
    config: EventServiceConfig,
}

impl<S: Store> EventService<S> {
    pub fn new(store: Arc<S>, config: EventServiceConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EventServiceConfig {
        &self.config
    }

    /// Ingest an event.
    ///
    /// 1. Structural checks (field encodings, content size, timestamp)
    /// 2. Id and signature verification
    /// 3. Dedupe by id
    /// 4. Insert
    ///
    /// Re-ingesting a stored event is not an error.
    pub async fn ingest(&self, event: &Event) -> Result<Ingested> {
        // 1. Structure
        event.check(self.config.max_content_bytes, unix_now())?;

        // 2. Verification
        if let Err(e) = verify_event_detailed(event) {
            warn!(id = %event.id, pubkey = %event.pubkey, error = %e, "Rejected event");
            return Err(e.into());
        }
        let id = event.event_id()?;
        let event = normalized(event);

        // 3. Dedupe
        if self.store.get_event(&event.id).await?.is_some() {
            debug!(id = %event.id, "Event already stored");
            return Ok(Ingested::Duplicate(id));
        }

        // 4. Insert; a concurrent ingest of the same id may win the race
        match self.store.insert_event(&event).await? {
            InsertResult::Inserted => {
                info!(id = %event.id, kind = event.kind, pubkey = %event.pubkey, "Stored event");
                Ok(Ingested::Stored(id))
            }
            InsertResult::AlreadyExists => Ok(Ingested::Duplicate(id)),
        }
    }

    /// Get a stored event by hex id.
    pub async fn get_event(&self, id: &str) -> Result<Option<Event>> {
        let id = EventId::from_hex(id)?;
        Ok(self.store.get_event(&id.to_hex()).await?)
    }

    /// List stored events, newest first.
    pub async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>> {
        let query = EventQuery {
            pubkey: query.pubkey.as_ref().map(|pk| pk.to_ascii_lowercase()),
            ..query.clone()
        };
        Ok(self.store.list_events(&query).await?)
    }
}

/// Copy of `event` with lowercase hex fields, so ids compare byte-for-byte.
fn normalized(event: &Event) -> Event {
    Event {
        id: event.id.to_ascii_lowercase(),
        pubkey: event.pubkey.to_ascii_lowercase(),
        sig: event.sig.to_ascii_lowercase(),
        ..event.clone()
    }
}
