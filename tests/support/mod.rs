//! In-memory back-office backend served by axum on a loopback port.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const TOKEN: &str = "secret";

type Reply = (StatusCode, Json<Value>);

#[derive(Default)]
pub struct Backend {
    pub collections: HashMap<String, Vec<Value>>,
    pub next_id: i64,
    pub uploads: Vec<String>,
    pub requests: Vec<String>,
}

pub type Shared = Arc<Mutex<Backend>>;

/// Collections that answer with a `{ data, total, totalPages }` envelope; the rest return a bare array.
const PAGINATED: &[(&str, &str, &str)] = &[("products", "data", "name"), ("discounts", "discounts", "search")];

pub struct TestServer {
    pub base_url: String,
    pub backend: Shared,
}

impl TestServer {
    pub async fn start() -> TestServer {
        let backend: Shared = Arc::new(Mutex::new(Backend {
            next_id: 100,
            ..Default::default()
        }));
        let app = Router::new()
            .route("/upload", post(upload))
            .route("/:collection", get(list).post(create))
            .route("/:collection/:id", get(read).patch(update).delete(remove))
            .with_state(backend.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        TestServer {
            base_url: format!("http://{}", addr),
            backend,
        }
    }

    pub fn seed(&self, collection: &str, rows: Vec<Value>) {
        self.backend
            .lock()
            .unwrap()
            .collections
            .insert(collection.to_string(), rows);
    }

    pub fn rows(&self, collection: &str) -> Vec<Value> {
        self.backend
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<String> {
        self.backend.lock().unwrap().requests.clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.backend.lock().unwrap().uploads.clone()
    }
}

fn authorized(headers: &HeaderMap) -> Result<(), Reply> {
    let expected = format!("Bearer {}", TOKEN);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(v) if v == expected => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" })))),
    }
}

fn not_found() -> Reply {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" })))
}

async fn list(
    State(backend): State<Shared>,
    Path(collection): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<Value>, Reply> {
    authorized(&headers)?;
    let mut b = backend.lock().unwrap();
    let mut pairs: Vec<_> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    pairs.sort();
    b.requests.push(format!("GET /{}?{}", collection, pairs.join("&")));
    let rows = b.collections.get(&collection).cloned().ok_or_else(not_found)?;

    let Some((_, list_key, search)) = PAGINATED.iter().find(|(c, _, _)| *c == collection) else {
        return Ok(Json(Value::Array(rows)));
    };
    let rows: Vec<Value> = match params.get(*search) {
        Some(term) => rows
            .into_iter()
            .filter(|r| r["name"].as_str().map(|n| n.contains(term.as_str())).unwrap_or(false))
            .collect(),
        None => rows,
    };
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = params.get("limit").and_then(|p| p.parse().ok()).unwrap_or(10);
    let total = rows.len();
    let data: Vec<Value> = rows.into_iter().skip((page - 1) * limit).take(limit).collect();
    let mut body = Map::new();
    body.insert(list_key.to_string(), Value::Array(data));
    body.insert("total".into(), json!(total));
    body.insert("totalPages".into(), json!(total.div_ceil(limit).max(1)));
    Ok(Json(Value::Object(body)))
}

async fn read(
    State(backend): State<Shared>,
    Path((collection, id)): Path<(String, i64)>,
    headers: HeaderMap,
) -> Result<Json<Value>, Reply> {
    authorized(&headers)?;
    let b = backend.lock().unwrap();
    b.collections
        .get(&collection)
        .and_then(|rows| rows.iter().find(|r| r["id"] == json!(id)).cloned())
        .map(|row| Json(json!({ "data": row })))
        .ok_or_else(not_found)
}

async fn create(
    State(backend): State<Shared>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Result<Reply, Reply> {
    authorized(&headers)?;
    let mut b = backend.lock().unwrap();
    b.requests.push(format!("POST /{}", collection));
    let duplicate = b
        .collections
        .get(&collection)
        .map(|rows| rows.iter().any(|r| r.get("name").is_some() && r.get("name") == body.get("name")))
        .unwrap_or(false);
    if duplicate {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": ["name must be unique"] })),
        ));
    }
    b.next_id += 1;
    let mut row = body;
    row.insert("id".into(), json!(b.next_id));
    let row = Value::Object(row);
    b.collections.entry(collection).or_default().push(row.clone());
    Ok((StatusCode::CREATED, Json(row)))
}

async fn update(
    State(backend): State<Shared>,
    Path((collection, id)): Path<(String, i64)>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Value>, Reply> {
    authorized(&headers)?;
    let mut b = backend.lock().unwrap();
    b.requests.push(format!("PATCH /{}/{}", collection, id));
    let row = b
        .collections
        .get_mut(&collection)
        .and_then(|rows| rows.iter_mut().find(|r| r["id"] == json!(id)))
        .ok_or_else(not_found)?;
    if let Some(obj) = row.as_object_mut() {
        for (k, v) in body {
            obj.insert(k, v);
        }
    }
    Ok(Json(row.clone()))
}

async fn remove(
    State(backend): State<Shared>,
    Path((collection, id)): Path<(String, i64)>,
    headers: HeaderMap,
) -> Result<StatusCode, Reply> {
    authorized(&headers)?;
    let mut b = backend.lock().unwrap();
    b.requests.push(format!("DELETE /{}/{}", collection, id));
    let rows = b.collections.get_mut(&collection).ok_or_else(not_found)?;
    let before = rows.len();
    rows.retain(|r| r["id"] != json!(id));
    if rows.len() == before {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Answers with the storage backend's `htpp://` scheme typo.
async fn upload(State(backend): State<Shared>, headers: HeaderMap, mut multipart: Multipart) -> Result<Json<Value>, Reply> {
    authorized(&headers)?;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("file").to_string();
        let bytes = field.bytes().await.map_err(|_| {
            (StatusCode::BAD_REQUEST, Json(json!({ "message": "unreadable file" })))
        })?;
        let mut b = backend.lock().unwrap();
        b.uploads.push(format!("{} ({} bytes)", name, bytes.len()));
        return Ok(Json(json!({ "url": format!("htpp://files.test/{}", name) })));
    }
    Err((StatusCode::BAD_REQUEST, Json(json!({ "message": "file is required" }))))
}
