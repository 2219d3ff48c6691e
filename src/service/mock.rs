//! Scripted in-memory backend for unit tests.

use crate::error::ClientError;
use crate::query::ListQuery;
use crate::service::{FileUpload, ResourceApi, Uploader};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub id: Option<i64>,
    pub query: Option<ListQuery>,
    pub body: Option<Map<String, Value>>,
    pub token: Option<String>,
}

#[derive(Default)]
struct Script {
    requests: Vec<Recorded>,
    list: VecDeque<(Duration, Result<Value, ClientError>)>,
    read: VecDeque<Result<Value, ClientError>>,
    create: VecDeque<Result<Value, ClientError>>,
    update: VecDeque<Result<Value, ClientError>>,
    delete: VecDeque<Result<(), ClientError>>,
    uploads: VecDeque<Result<String, ClientError>>,
    uploaded: Vec<String>,
    next_id: i64,
}

/// Unscripted calls succeed: empty list, echo create with a fresh id, echo update, delete ok.
#[derive(Default)]
pub struct MockApi {
    script: Mutex<Script>,
}

impl MockApi {
    pub fn new() -> Self {
        MockApi {
            script: Mutex::new(Script {
                next_id: 1000,
                ..Default::default()
            }),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
        let mut guard = self.script.lock().unwrap();
        f(&mut guard)
    }

    pub fn push_list(&self, r: Result<Value, ClientError>) {
        self.with(|s| s.list.push_back((Duration::ZERO, r)));
    }

    pub fn push_list_delayed(&self, delay: Duration, r: Result<Value, ClientError>) {
        self.with(|s| s.list.push_back((delay, r)));
    }

    pub fn push_read(&self, r: Result<Value, ClientError>) {
        self.with(|s| s.read.push_back(r));
    }

    pub fn push_create(&self, r: Result<Value, ClientError>) {
        self.with(|s| s.create.push_back(r));
    }

    pub fn push_update(&self, r: Result<Value, ClientError>) {
        self.with(|s| s.update.push_back(r));
    }

    pub fn push_delete(&self, r: Result<(), ClientError>) {
        self.with(|s| s.delete.push_back(r));
    }

    pub fn push_upload(&self, r: Result<String, ClientError>) {
        self.with(|s| s.uploads.push_back(r));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.with(|s| s.requests.clone())
    }

    pub fn requests_of(&self, method: &str) -> Vec<Recorded> {
        self.with(|s| s.requests.iter().filter(|r| r.method == method).cloned().collect())
    }

    pub fn uploads(&self) -> Vec<String> {
        self.with(|s| s.uploaded.clone())
    }

    fn record(
        &self,
        method: &'static str,
        path: &str,
        id: Option<i64>,
        query: Option<&ListQuery>,
        body: Option<&Map<String, Value>>,
        token: Option<&str>,
    ) {
        self.with(|s| {
            s.requests.push(Recorded {
                method,
                path: path.to_string(),
                id,
                query: query.cloned(),
                body: body.cloned(),
                token: token.map(str::to_string),
            })
        });
    }
}

/// `n` rows `{ id, name }` starting at `first_id`, in a paginated envelope.
pub fn page_of(first_id: i64, n: i64, total: u64) -> Value {
    let rows: Vec<Value> = (first_id..first_id + n)
        .map(|id| json!({ "id": id, "name": format!("row {id}") }))
        .collect();
    json!({ "data": rows, "total": total })
}

#[async_trait]
impl ResourceApi for MockApi {
    async fn list(&self, path: &str, query: &ListQuery, token: Option<&str>) -> Result<Value, ClientError> {
        self.record("GET", path, None, Some(query), None, token);
        let (delay, r) = self
            .with(|s| s.list.pop_front())
            .unwrap_or((Duration::ZERO, Ok(json!({ "data": [], "total": 0 }))));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        r
    }

    async fn read(&self, path: &str, id: i64, token: Option<&str>) -> Result<Value, ClientError> {
        self.record("GET", path, Some(id), None, None, token);
        self.with(|s| s.read.pop_front())
            .unwrap_or_else(|| Err(ClientError::Network("404: Not Found".into())))
    }

    async fn create(&self, path: &str, body: &Map<String, Value>, token: Option<&str>) -> Result<Value, ClientError> {
        self.record("POST", path, None, None, Some(body), token);
        self.with(|s| match s.create.pop_front() {
            Some(r) => r,
            None => {
                s.next_id += 1;
                let mut row = body.clone();
                row.insert("id".into(), json!(s.next_id));
                Ok(Value::Object(row))
            }
        })
    }

    async fn update(
        &self,
        path: &str,
        id: i64,
        body: &Map<String, Value>,
        token: Option<&str>,
    ) -> Result<Value, ClientError> {
        self.record("PATCH", path, Some(id), None, Some(body), token);
        self.with(|s| s.update.pop_front())
            .unwrap_or_else(|| Ok(Value::Object(body.clone())))
    }

    async fn delete(&self, path: &str, id: i64, token: Option<&str>) -> Result<(), ClientError> {
        self.record("DELETE", path, Some(id), None, None, token);
        self.with(|s| s.delete.pop_front()).unwrap_or(Ok(()))
    }
}

#[async_trait]
impl Uploader for MockApi {
    async fn upload(&self, file: &FileUpload, _token: Option<&str>) -> Result<String, ClientError> {
        self.with(|s| {
            s.uploaded.push(file.file_name.clone());
            s.uploads
                .pop_front()
                .unwrap_or_else(|| Ok(format!("http://cdn.test/{}", file.file_name)))
        })
    }
}
