//! ResourceItem: an opaque field map identified by the backend-assigned integer id.

use crate::error::ClientError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq)]
pub struct ResourceItem {
    id: i64,
    fields: Map<String, Value>,
}

impl ResourceItem {
    /// Accepts a JSON object carrying an integer `id` (a numeric string is tolerated).
    pub fn from_value(value: Value) -> Result<Self, ClientError> {
        let fields = match value {
            Value::Object(m) => m,
            other => {
                return Err(ClientError::Network(format!(
                    "expected a JSON object for an item, got {}",
                    other
                )))
            }
        };
        let id = match fields.get("id") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        }
        .ok_or_else(|| ClientError::Network("item is missing an integer id".into()))?;
        Ok(ResourceItem { id, fields })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Shallow merge: each key of `patch` overwrites the prior value. `id` never changes.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for (k, v) in patch {
            if k == "id" {
                continue;
            }
            self.fields.insert(k.clone(), v.clone());
        }
    }

    /// Decode into a typed view (see `entities`).
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| ClientError::Network(format!("item {}: {}", self.id, e)))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl Serialize for ResourceItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}
