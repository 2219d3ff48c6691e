//! File upload pipeline: upload picked files, then substitute the returned URLs into the payload.

use crate::case::{object_keys_to_camel_case, to_camel_case};
use crate::config::ResolvedResource;
use crate::error::ClientError;
use crate::service::api::HttpApi;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Self {
        FileUpload {
            file_name: file_name.to_string(),
            content_type: None,
            bytes,
        }
    }

    pub fn content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::validation(format!("cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Ok(FileUpload::new(&file_name, bytes))
    }
}

/// Stores a file and returns its public URL.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: &FileUpload, token: Option<&str>) -> Result<String, ClientError>;
}

/// The storage backend answers `htpp://...`; fix the scheme.
pub fn normalize_upload_url(url: &str) -> String {
    match url.strip_prefix("htpp:") {
        Some(rest) => format!("http:{}", rest),
        None => url.to_string(),
    }
}

#[async_trait]
impl Uploader for HttpApi {
    /// `POST /upload` as multipart with a single `file` part; expects `{ "url": "..." }`.
    async fn upload(&self, file: &FileUpload, token: Option<&str>) -> Result<String, ClientError> {
        tracing::debug!(method = "POST", path = %self.upload_path, file = %file.file_name, size = file.bytes.len(), "upload");
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(ct) = &file.content_type {
            part = part
                .mime_str(ct)
                .map_err(|e| ClientError::validation(format!("invalid content type {}: {}", ct, e)))?;
        }
        let form = Form::new().part("file", part);
        let rb = self.client().post(self.url(&self.upload_path)).multipart(form);
        let body = self.send(HttpApi::authorize(rb, token)).await?;
        body.get("url")
            .and_then(Value::as_str)
            .map(normalize_upload_url)
            .ok_or_else(|| ClientError::Network("upload response has no 'url'".into()))
    }
}

/// A form value: plain JSON, or a file that still has to be uploaded.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Value(Value),
    File(FileUpload),
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Value(v)
    }
}

impl From<FileUpload> for FieldValue {
    fn from(f: FileUpload) -> Self {
        FieldValue::File(f)
    }
}

/// Submitted form values for create/update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormPayload {
    fields: BTreeMap<String, FieldValue>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), FieldValue::Value(value.into()));
        self
    }

    pub fn file(mut self, key: &str, file: FileUpload) -> Self {
        self.fields.insert(key.to_string(), FieldValue::File(file));
        self
    }

    pub fn insert(&mut self, key: &str, value: FieldValue) {
        self.fields.insert(key.to_string(), value);
    }

    pub fn has_files(&self) -> bool {
        self.fields.values().any(|v| matches!(v, FieldValue::File(_)))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for FormPayload {
    fn from(map: Map<String, Value>) -> Self {
        FormPayload {
            fields: map.into_iter().map(|(k, v)| (k, FieldValue::Value(v))).collect(),
        }
    }
}

/// Form values split into ready JSON and files still to upload. Keys are camelCase.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreparedForm {
    pub body: Map<String, Value>,
    pub files: Vec<(String, FileUpload)>,
}

impl PreparedForm {
    pub fn pending_fields(&self) -> Vec<&str> {
        self.files.iter().map(|(k, _)| k.as_str()).collect()
    }
}

/// Two steps: `prepare` splits the form (files only on upload fields), `upload` stores each file
/// and substitutes the returned URL into its field.
#[derive(Clone)]
pub struct UploadPipeline {
    uploader: Arc<dyn Uploader>,
}

impl UploadPipeline {
    pub fn new(uploader: Arc<dyn Uploader>) -> Self {
        UploadPipeline { uploader }
    }

    pub fn prepare(&self, form: FormPayload, resource: &ResolvedResource) -> Result<PreparedForm, ClientError> {
        let mut prepared = PreparedForm::default();
        for (key, value) in form.fields {
            match value {
                FieldValue::Value(v) => {
                    prepared.body.insert(key, v);
                }
                FieldValue::File(file) => {
                    let key = to_camel_case(&key);
                    if !resource.is_upload_field(&key) {
                        return Err(ClientError::field(&key, format!("{} does not accept files", key)));
                    }
                    prepared.files.push((key, file));
                }
            }
        }
        object_keys_to_camel_case(&mut prepared.body);
        Ok(prepared)
    }

    pub async fn upload(&self, prepared: PreparedForm, token: Option<&str>) -> Result<Map<String, Value>, ClientError> {
        let PreparedForm { mut body, files } = prepared;
        for (key, file) in files {
            let url = self.uploader.upload(&file, token).await?;
            tracing::debug!(field = %key, url = %url, "uploaded");
            body.insert(key, Value::String(url));
        }
        Ok(body)
    }

    pub async fn resolve(
        &self,
        form: FormPayload,
        resource: &ResolvedResource,
        token: Option<&str>,
    ) -> Result<Map<String, Value>, ClientError> {
        let prepared = self.prepare(form, resource)?;
        self.upload(prepared, token).await
    }
}
