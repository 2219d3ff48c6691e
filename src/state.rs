//! Client-held view state for one list screen: the current page and its filters.

use crate::case::to_camel_case;
use crate::item::ResourceItem;
use crate::response::ListPage;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Filter key -> value. Keys are stored camelCase; unset keys are simply absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    values: BTreeMap<String, Value>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear one key. `None` and JSON null clear it. Returns whether the state changed.
    pub fn set(&mut self, key: &str, value: Option<Value>) -> bool {
        let key = to_camel_case(key);
        match value {
            None | Some(Value::Null) => self.values.remove(&key).is_some(),
            Some(v) => self.values.insert(key, v.clone()).as_ref() != Some(&v),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(&to_camel_case(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListState {
    pub items: Vec<ResourceItem>,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: Option<u64>,
    /// A list fetch is in flight.
    pub loading: bool,
    /// User-visible message of the last failed fetch; cleared by the next successful one.
    pub error: Option<String>,
}

impl ListState {
    pub fn new(page_size: u32) -> Self {
        ListState {
            items: Vec::new(),
            page: 1,
            page_size,
            total: 0,
            total_pages: None,
            loading: false,
            error: None,
        }
    }

    pub(crate) fn replace_page(&mut self, page: ListPage) {
        self.items = page.items;
        self.total = page.total;
        self.total_pages = page.total_pages;
        self.error = None;
    }

    pub fn contains(&self, id: i64) -> bool {
        self.items.iter().any(|i| i.id() == id)
    }

    pub fn item(&self, id: i64) -> Option<&ResourceItem> {
        self.items.iter().find(|i| i.id() == id)
    }

    /// Appends even past `page_size`; the next fetch trims the page again.
    pub(crate) fn push(&mut self, item: ResourceItem) {
        self.items.push(item);
        self.total += 1;
    }

    pub(crate) fn merge(&mut self, id: i64, patch: &Map<String, Value>) -> bool {
        match self.items.iter_mut().find(|i| i.id() == id) {
            Some(item) => {
                item.merge(patch);
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id() != id);
        let removed = self.items.len() != before;
        if removed {
            self.total = self.total.saturating_sub(1);
        }
        removed
    }
}
