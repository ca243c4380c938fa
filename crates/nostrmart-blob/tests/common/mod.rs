//! In-process blob server for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use bytes::Bytes;
use nostrmart_blob::parse_authorization_header;
use nostrmart_core::{kinds, sha256_hex, verify_event, Event};
use serde_json::json;
use tokio::net::TcpListener;

/// Base URL that refuses connections.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

#[derive(Default)]
pub struct MockState {
    pub base_url: Mutex<String>,
    blobs: Mutex<HashMap<String, (Bytes, Option<String>)>>,
    owners: Mutex<HashMap<String, Vec<String>>>,
    /// Serve wrong bytes for every fetch.
    pub corrupt: AtomicBool,
    /// Answer every request with 500.
    pub failing: AtomicBool,
    pub requests: AtomicUsize,
}

impl MockState {
    pub fn has(&self, sha256: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(sha256)
    }

    pub fn insert(&self, owner: &str, data: &[u8], mime: Option<&str>) -> String {
        let hash = sha256_hex(data);
        self.blobs.lock().unwrap().insert(
            hash.clone(),
            (Bytes::copy_from_slice(data), mime.map(str::to_string)),
        );
        self.owners
            .lock()
            .unwrap()
            .entry(owner.to_string())
            .or_default()
            .push(hash.clone());
        hash
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn descriptor(&self, hash: &str) -> Option<serde_json::Value> {
        let blobs = self.blobs.lock().unwrap();
        let (data, mime) = blobs.get(hash)?;
        Some(json!({
            "url": format!("{}/{}", self.base_url.lock().unwrap(), hash),
            "sha256": hash,
            "size": data.len(),
            "type": mime,
            "uploaded": 1_700_000_000u64,
        }))
    }

    fn gate(&self) -> Result<(), StatusCode> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Ok(())
    }
}

pub struct MockServer {
    pub url: String,
    pub state: Arc<MockState>,
}

impl MockServer {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/upload", put(upload).head(upload_info))
            .route("/list/:pubkey", get(list))
            .route("/:sha256", get(fetch).delete(delete))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let url = format!("http://{}", addr);
        *state.base_url.lock().unwrap() = url.clone();
        Self { url, state }
    }
}

/// Require a verified kind-24242 event with the given action.
fn require_auth(headers: &HeaderMap, action: &str) -> Result<Event, StatusCode> {
    let event = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_authorization_header)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if event.kind != kinds::BLOB_AUTH
        || event.tag_value("t") != Some(action)
        || !verify_event(&event)
    {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(event)
}

async fn upload(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(status) = state.gate() {
        return status.into_response();
    }
    let event = match require_auth(&headers, "upload") {
        Ok(event) => event,
        Err(status) => return status.into_response(),
    };

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let mime = field.content_type().map(str::to_string);
        let Ok(data) = field.bytes().await else {
            return StatusCode::BAD_REQUEST.into_response();
        };
        if event.tag_value("x") != Some(sha256_hex(&data).as_str()) {
            return StatusCode::FORBIDDEN.into_response();
        }
        let hash = state.insert(&event.pubkey, &data, mime.as_deref());
        return Json(state.descriptor(&hash)).into_response();
    }
    StatusCode::BAD_REQUEST.into_response()
}

async fn upload_info(State(state): State<Arc<MockState>>) -> Response {
    if let Err(status) = state.gate() {
        return status.into_response();
    }
    (
        [
            ("x-max-file-size", "1048576"),
            ("x-supported-types", "image/png,image/jpeg"),
        ],
        StatusCode::OK,
    )
        .into_response()
}

async fn fetch(State(state): State<Arc<MockState>>, Path(sha256): Path<String>) -> Response {
    if let Err(status) = state.gate() {
        return status.into_response();
    }
    let blob = state.blobs.lock().unwrap().get(&sha256).cloned();
    match blob {
        Some(_) if state.corrupt.load(Ordering::SeqCst) => {
            Bytes::from_static(b"tampered").into_response()
        }
        Some((data, _)) => data.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn list(State(state): State<Arc<MockState>>, Path(pubkey): Path<String>) -> Response {
    if let Err(status) = state.gate() {
        return status.into_response();
    }
    let hashes = state
        .owners
        .lock()
        .unwrap()
        .get(&pubkey)
        .cloned()
        .unwrap_or_default();
    let entries: Vec<_> = hashes.iter().filter_map(|h| state.descriptor(h)).collect();
    Json(entries).into_response()
}

async fn delete(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(sha256): Path<String>,
) -> Response {
    if let Err(status) = state.gate() {
        return status.into_response();
    }
    if let Err(status) = require_auth(&headers, "delete") {
        return status.into_response();
    }
    match state.blobs.lock().unwrap().remove(&sha256) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
