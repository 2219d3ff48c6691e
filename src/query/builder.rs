//! Builds the GET query for a list request from resource, page and filters.

use crate::config::ResolvedResource;
use crate::query::QueryValue;
use crate::state::FilterState;

/// Ordered query params: `page`, `limit`, then filters in key order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub params: Vec<(String, String)>,
}

impl ListQuery {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// `page=1&limit=10&sortBy=price` (unescaped; for logs and tests).
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Query for one page of a resource. Unpaginated resources get no `page`/`limit`.
/// Filters whose value renders empty are omitted.
pub fn list_query(resource: &ResolvedResource, page: u32, page_size: u32, filters: &FilterState) -> ListQuery {
    let mut q = ListQuery::default();
    if resource.paginated {
        q.params.push(("page".into(), page.to_string()));
        q.params.push(("limit".into(), page_size.to_string()));
    }
    for (key, value) in filters.iter() {
        if key == "page" || key == "limit" {
            continue;
        }
        if let Some(v) = QueryValue::from_json(value) {
            q.params.push((key.to_string(), v.into_string()));
        }
    }
    q
}

/// Query for a plain page fetch without filters (option pickers).
pub fn page_query(page: u32, page_size: u32) -> ListQuery {
    ListQuery {
        params: vec![
            ("page".into(), page.to_string()),
            ("limit".into(), page_size.to_string()),
        ],
    }
}
