//! In-process REST store and blob server for integration tests.

#![allow(dead_code)]

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use nostrmart_core::sha256_hex;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Base URL that refuses connections.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

pub const API_KEY: &str = "anon-key";
pub const SERVICE_KEY: &str = "service-key";

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

// ─────────────────────────────────────────────────────────────────────────────
// REST store
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RestState {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    /// Answer this many upcoming requests with 503.
    pub fail_next: AtomicUsize,
    pub requests: AtomicUsize,
    /// `apikey` header of every request, in order.
    pub keys: Mutex<Vec<String>>,
    next_id: AtomicUsize,
}

impl RestState {
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn gate(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let key = headers
            .get("apikey")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bearer = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        self.keys.lock().unwrap().push(key.clone());

        let pending = self.fail_next.load(Ordering::SeqCst);
        if pending > 0 {
            self.fail_next.store(pending - 1, Ordering::SeqCst);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
        if (key != API_KEY && key != SERVICE_KEY) || bearer != format!("Bearer {}", key) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        Ok(())
    }
}

pub struct MockRest {
    pub url: String,
    pub state: Arc<RestState>,
}

impl MockRest {
    pub async fn start() -> Self {
        let state = Arc::new(RestState::default());
        let app = Router::new()
            .route("/rest/v1/:table", get(select).post(insert))
            .with_state(state.clone());
        let url = serve(app).await;
        Self { url, state }
    }
}

fn column_matches(row: &Value, column: &str, expected: &str) -> bool {
    match &row[column] {
        Value::String(s) => s == expected,
        Value::Null => false,
        other => other.to_string() == expected,
    }
}

fn newest_first(a: &Value, b: &Value) -> CmpOrdering {
    let (a, b) = (&a["created_at"], &b["created_at"]);
    match (a.as_u64(), b.as_u64()) {
        (Some(a), Some(b)) => b.cmp(&a),
        _ => b.as_str().cmp(&a.as_str()),
    }
}

async fn select(
    State(state): State<Arc<RestState>>,
    headers: HeaderMap,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(status) = state.gate(&headers) {
        return status.into_response();
    }

    let mut rows: Vec<Value> = state
        .rows(&table)
        .into_iter()
        .filter(|row| {
            params.iter().all(|(column, filter)| {
                match filter.strip_prefix("eq.") {
                    Some(value) => column_matches(row, column, value),
                    None => true,
                }
            })
        })
        .collect();

    if params.get("order").map(String::as_str) == Some("created_at.desc") {
        rows.sort_by(newest_first);
    }
    let offset = params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(usize::MAX);
    let rows: Vec<Value> = rows.into_iter().skip(offset).take(limit).collect();
    Json(rows).into_response()
}

async fn insert(
    State(state): State<Arc<RestState>>,
    headers: HeaderMap,
    Path(table): Path<String>,
    Json(mut row): Json<Value>,
) -> Response {
    if let Err(status) = state.gate(&headers) {
        return status.into_response();
    }

    let mut tables = state.tables.lock().unwrap();
    let rows = tables.entry(table.clone()).or_default();
    match table.as_str() {
        "nostr_events" => {
            if rows.iter().any(|r| r["id"] == row["id"]) {
                return (StatusCode::CONFLICT, Json(json!({"code": "23505"}))).into_response();
            }
        }
        "media_objects" => {
            let n = state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            row["id"] = json!(n.to_string());
            row["created_at"] = json!(format!("2025-01-01T00:00:{:02}Z", n));
        }
        _ => return StatusCode::NOT_FOUND.into_response(),
    }
    rows.push(row.clone());
    (StatusCode::CREATED, Json(vec![row])).into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// Blob server (upload only)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct BlobState {
    pub base_url: Mutex<String>,
    pub blobs: Mutex<HashMap<String, Vec<u8>>>,
    pub requests: AtomicUsize,
}

pub struct MockBlobServer {
    pub url: String,
    pub state: Arc<BlobState>,
}

impl MockBlobServer {
    pub async fn start() -> Self {
        let state = Arc::new(BlobState::default());
        let app = Router::new()
            .route("/upload", put(upload))
            .with_state(state.clone());
        let url = serve(app).await;
        *state.base_url.lock().unwrap() = url.clone();
        Self { url, state }
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn has(&self, sha256: &str) -> bool {
        self.state.blobs.lock().unwrap().contains_key(sha256)
    }
}

async fn upload(
    State(state): State<Arc<BlobState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if headers.get("authorization").is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let mime = field.content_type().map(str::to_string);
        let Ok(data) = field.bytes().await else {
            return StatusCode::BAD_REQUEST.into_response();
        };
        let hash = sha256_hex(&data);
        state.blobs.lock().unwrap().insert(hash.clone(), data.to_vec());
        let base = state.base_url.lock().unwrap().clone();
        return Json(json!({
            "url": format!("{}/{}", base, hash),
            "sha256": hash,
            "size": data.len(),
            "type": mime,
            "uploaded": 1_700_000_000u64,
        }))
        .into_response();
    }
    StatusCode::BAD_REQUEST.into_response()
}
