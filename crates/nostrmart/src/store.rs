//! Store trait: the backing service for events and media records.
//!
//! The production backend is a PostgREST-style HTTP service
//! ([`crate::rest::RestClient`]). [`MemoryStore`] has the same semantics and
//! keeps everything in process, for tests and local runs.

use std::collections::HashMap;

use async_trait::async_trait;
use nostrmart_core::Event;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl StoreError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Transport(_) => true,
            StoreError::Status { status, .. } => *status >= 500,
            StoreError::Decode(_) => false,
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Result of inserting an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// Event was inserted.
    Inserted,
    /// An event with the same id already exists (idempotent, not an error).
    AlreadyExists,
}

/// Filter for listing events, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub pubkey: Option<String>,
    pub kind: Option<u16>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            pubkey: None,
            kind: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// A media record to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMediaObject {
    pub url: String,
    pub uploader_pubkey: String,
    pub size_bytes: u64,
    pub mime_type: Option<String>,
    pub checksum: String,
}

/// A stored media record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaObject {
    pub id: String,
    pub url: String,
    pub uploader_pubkey: String,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Async interface to the backing store.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert an event. Inserting an id that already exists is not an error.
    async fn insert_event(&self, event: &Event) -> Result<InsertResult>;

    /// Get an event by its hex id.
    async fn get_event(&self, id: &str) -> Result<Option<Event>>;

    /// List events matching a filter, newest first.
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Media
    // ─────────────────────────────────────────────────────────────────────────

    /// Record an uploaded media object.
    async fn insert_media_object(&self, media: &NewMediaObject) -> Result<MediaObject>;

    /// Get a media record by id.
    async fn get_media_object(&self, id: &str) -> Result<Option<MediaObject>>;

    /// List media records by uploader, newest first.
    async fn list_media_by_uploader(
        &self,
        pubkey: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MediaObject>>;
}

/// In-memory store implementation.
///
/// All data is lost when the store is dropped.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Events indexed by id.
    events: HashMap<String, Event>,
    /// Media records in insertion order.
    media: Vec<MediaObject>,
    next_media_id: u64,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    pub async fn event_count(&self) -> usize {
        self.inner.read().await.events.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_event(&self, event: &Event) -> Result<InsertResult> {
        let mut inner = self.inner.write().await;
        if inner.events.contains_key(&event.id) {
            return Ok(InsertResult::AlreadyExists);
        }
        inner.events.insert(event.id.clone(), event.clone());
        Ok(InsertResult::Inserted)
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>> {
        Ok(self.inner.read().await.events.get(id).cloned())
    }

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>> {
        let inner = self.inner.read().await;
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|e| query.pubkey.as_deref().map_or(true, |pk| e.pubkey == pk))
            .filter(|e| query.kind.map_or(true, |k| e.kind == k))
            .cloned()
            .collect();

        events.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(events
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn insert_media_object(&self, media: &NewMediaObject) -> Result<MediaObject> {
        let mut inner = self.inner.write().await;
        inner.next_media_id += 1;
        let record = MediaObject {
            id: inner.next_media_id.to_string(),
            url: media.url.clone(),
            uploader_pubkey: media.uploader_pubkey.clone(),
            size_bytes: Some(media.size_bytes),
            mime_type: media.mime_type.clone(),
            checksum: Some(media.checksum.clone()),
            created_at: None,
        };
        inner.media.push(record.clone());
        Ok(record)
    }

    async fn get_media_object(&self, id: &str) -> Result<Option<MediaObject>> {
        let inner = self.inner.read().await;
        Ok(inner.media.iter().find(|m| m.id == id).cloned())
    }

    async fn list_media_by_uploader(
        &self,
        pubkey: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MediaObject>> {
        let inner = self.inner.read().await;
        Ok(inner
            .media
            .iter()
            .rev()
            .filter(|m| m.uploader_pubkey == pubkey)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nostrmart_testkit::TestFixture;

    #[tokio::test]
    async fn test_memory_store_idempotent() {
        let store = MemoryStore::new();
        let event = TestFixture::new().note("hello");

        assert_eq!(store.insert_event(&event).await.unwrap(), InsertResult::Inserted);
        assert_eq!(
            store.insert_event(&event).await.unwrap(),
            InsertResult::AlreadyExists
        );
        assert_eq!(store.event_count().await, 1);
        assert_eq!(store.get_event(&event.id).await.unwrap(), Some(event));
    }

    #[tokio::test]
    async fn test_list_events_filters_and_orders() {
        let store = MemoryStore::new();
        let alice = TestFixture::with_seed(1);
        let bob = TestFixture::with_seed(2);

        for (i, fixture) in [&alice, &bob, &alice].iter().enumerate() {
            let event = fixture.note_at("x", 1_700_000_000 + i as u64);
            store.insert_event(&event).await.unwrap();
        }
        let auth = alice.auth_event_at("c", 1_700_000_010);
        store.insert_event(&auth).await.unwrap();

        let all_alice = store
            .list_events(&EventQuery {
                pubkey: Some(alice.pubkey_hex()),
                ..EventQuery::default()
            })
            .await
            .unwrap();
        let times: Vec<_> = all_alice.iter().map(|e| e.created_at).collect();
        assert_eq!(times, vec![1_700_000_010, 1_700_000_002, 1_700_000_000]);

        let notes = store
            .list_events(&EventQuery {
                kind: Some(1),
                limit: 2,
                offset: 1,
                ..EventQuery::default()
            })
            .await
            .unwrap();
        let times: Vec<_> = notes.iter().map(|e| e.created_at).collect();
        assert_eq!(times, vec![1_700_000_001, 1_700_000_000]);
    }

    #[tokio::test]
    async fn test_media_by_uploader() {
        let store = MemoryStore::new();
        for (i, owner) in ["aa", "bb", "aa"].iter().enumerate() {
            store
                .insert_media_object(&NewMediaObject {
                    url: format!("https://s/{}", i),
                    uploader_pubkey: owner.to_string(),
                    size_bytes: 1,
                    mime_type: None,
                    checksum: "00".into(),
                })
                .await
                .unwrap();
        }

        let media = store.list_media_by_uploader("aa", 10, 0).await.unwrap();
        let urls: Vec<_> = media.iter().map(|m| m.url.as_str()).collect();
        assert_eq!(urls, vec!["https://s/2", "https://s/0"]);

        let first = store.get_media_object(&media[1].id).await.unwrap().unwrap();
        assert_eq!(first.url, "https://s/0");
        assert!(store.get_media_object("missing").await.unwrap().is_none());
    }

    #[test]
    fn test_transient_errors() {
        let server_error = StoreError::Status {
            status: 503,
            body: String::new(),
        };
        let client_error = StoreError::Status {
            status: 409,
            body: String::new(),
        };
        assert!(server_error.is_transient());
        assert!(!client_error.is_transient());
        assert!(!StoreError::Decode("x".into()).is_transient());
    }
}
