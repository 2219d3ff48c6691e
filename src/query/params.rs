//! Convert serde_json::Value to query-string values.

use serde_json::Value;

/// A filter value as it goes on the wire. Built from JSON; empty values are not sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryValue(String);

impl QueryValue {
    /// `None` for null, empty strings and empty arrays; those keys are left out of the request.
    pub fn from_json(v: &Value) -> Option<Self> {
        let s = match v {
            Value::Null => return None,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => {
                let t = s.trim();
                if t.is_empty() {
                    return None;
                }
                t.to_string()
            }
            Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .filter_map(QueryValue::from_json)
                    .map(|q| q.0)
                    .collect();
                if parts.is_empty() {
                    return None;
                }
                parts.join(",")
            }
            Value::Object(_) => v.to_string(),
        };
        Some(QueryValue(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_scalars() {
        assert_eq!(QueryValue::from_json(&json!(true)).unwrap().as_str(), "true");
        assert_eq!(QueryValue::from_json(&json!(42)).unwrap().as_str(), "42");
        assert_eq!(QueryValue::from_json(&json!(" lamp ")).unwrap().as_str(), "lamp");
        assert_eq!(QueryValue::from_json(&json!([1, 2, null])).unwrap().as_str(), "1,2");
    }

    #[test]
    fn empty_values_are_dropped() {
        assert!(QueryValue::from_json(&Value::Null).is_none());
        assert!(QueryValue::from_json(&json!("")).is_none());
        assert!(QueryValue::from_json(&json!("   ")).is_none());
        assert!(QueryValue::from_json(&json!([])).is_none());
    }
}
