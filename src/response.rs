//! Response envelope decoding: list pages, single items and backend error bodies.

use crate::error::ClientError;
use crate::item::ResourceItem;
use serde_json::Value;

/// One decoded page of a list endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct ListPage {
    pub items: Vec<ResourceItem>,
    pub total: u64,
    pub total_pages: Option<u64>,
}

/// Decode `{ <list_key>: [...], total, totalPages? }` or a bare array (unpaginated resources).
/// Falls back to `data` when `list_key` is absent from the object; `total` defaults to the row count.
pub fn decode_list(body: Value, list_key: &str) -> Result<ListPage, ClientError> {
    match body {
        Value::Array(rows) => {
            let items = decode_items(rows)?;
            let total = items.len() as u64;
            Ok(ListPage {
                items,
                total,
                total_pages: Some(1),
            })
        }
        Value::Object(mut obj) => {
            let rows = obj
                .remove(list_key)
                .or_else(|| obj.remove("data"))
                .ok_or_else(|| ClientError::Network(format!("list response has no '{}' array", list_key)))?;
            let rows = match rows {
                Value::Array(rows) => rows,
                other => {
                    return Err(ClientError::Network(format!(
                        "list response '{}' is not an array: {}",
                        list_key, other
                    )))
                }
            };
            let items = decode_items(rows)?;
            let total = obj.get("total").and_then(as_u64).unwrap_or(items.len() as u64);
            let total_pages = obj.get("totalPages").and_then(as_u64);
            Ok(ListPage {
                items,
                total,
                total_pages,
            })
        }
        other => Err(ClientError::Network(format!("unexpected list response: {}", other))),
    }
}

fn decode_items(rows: Vec<Value>) -> Result<Vec<ResourceItem>, ClientError> {
    rows.into_iter().map(ResourceItem::from_value).collect()
}

fn as_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Decode a created/read item, unwrapping a `{ "data": {...} }` envelope when present.
pub fn decode_item(body: Value) -> Result<ResourceItem, ClientError> {
    match body {
        Value::Object(mut obj) if !obj.contains_key("id") && obj.get("data").map(Value::is_object).unwrap_or(false) => {
            ResourceItem::from_value(obj.remove("data").unwrap_or(Value::Null))
        }
        other => ResourceItem::from_value(other),
    }
}

/// Extract a human message from an error body. Understands `{ "message": "..." }`,
/// `{ "message": ["...", "..."] }` and `{ "error": { "message": "..." } }`.
pub fn error_message(body: &Value) -> Option<String> {
    match body.get("message") {
        Some(Value::String(s)) => return Some(s.clone()),
        Some(Value::Array(parts)) => {
            let parts: Vec<&str> = parts.iter().filter_map(Value::as_str).collect();
            if !parts.is_empty() {
                return Some(parts.join("; "));
            }
        }
        _ => {}
    }
    match body.get("error") {
        Some(Value::Object(detail)) => detail.get("message").and_then(Value::as_str).map(str::to_string),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Page count for a total and page size, at least 1.
pub fn page_count(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size as u64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paginated_envelope() {
        let page = decode_list(
            json!({ "data": [{ "id": 1 }, { "id": 2 }], "total": 42, "totalPages": 5 }),
            "data",
        )
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 42);
        assert_eq!(page.total_pages, Some(5));
    }

    #[test]
    fn alternate_list_key_and_bare_array() {
        let page = decode_list(json!({ "discounts": [{ "id": 9 }], "total": 1 }), "discounts").unwrap();
        assert_eq!(page.items[0].id(), 9);
        assert_eq!(page.total_pages, None);

        let page = decode_list(json!([{ "id": 1 }, { "id": 2 }, { "id": 3 }]), "data").unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, Some(1));
    }

    #[test]
    fn malformed_list_is_network_error() {
        assert!(matches!(decode_list(json!({ "rows": [] }), "data"), Err(ClientError::Network(_))));
        assert!(matches!(decode_list(json!({ "data": [{ "name": "x" }] }), "data"), Err(ClientError::Network(_))));
        assert!(matches!(decode_list(json!("nope"), "data"), Err(ClientError::Network(_))));
    }

    #[test]
    fn item_envelope_is_unwrapped() {
        assert_eq!(decode_item(json!({ "data": { "id": 4 } })).unwrap().id(), 4);
        assert_eq!(decode_item(json!({ "id": 5, "data": { "id": 6 } })).unwrap().id(), 5);
    }

    #[test]
    fn error_messages() {
        assert_eq!(error_message(&json!({ "message": "name should not be empty" })).as_deref(), Some("name should not be empty"));
        assert_eq!(error_message(&json!({ "message": ["a", "b"] })).as_deref(), Some("a; b"));
        assert_eq!(
            error_message(&json!({ "error": { "code": "validation_error", "message": "bad" } })).as_deref(),
            Some("bad")
        );
        assert_eq!(error_message(&json!({})), None);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
    }
}
