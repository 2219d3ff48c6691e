//! Raw catalog types matching the JSON catalog file (`{ "resources": [...] }`).

use serde::{Deserialize, Serialize};

/// Operations a resource may allow.
pub const OPERATIONS: &[&str] = &["list", "read", "create", "update", "delete"];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Integer,
    Boolean,
    Date,
    /// File picked in a form; uploaded first and replaced by the returned URL.
    Upload,
    /// Id of a row in another resource.
    Reference,
    /// List of ids of rows in another resource.
    ReferenceList,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

impl ValidationRule {
    pub fn required() -> Self {
        ValidationRule {
            required: Some(true),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Wire name (camelCase).
    pub name: String,
    #[serde(default)]
    pub kind: FieldKind,
    /// Path segment of the referenced resource, for reference fields.
    #[serde(default)]
    pub references: Option<String>,
    #[serde(default)]
    pub validation: ValidationRule,
}

impl FieldConfig {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        FieldConfig {
            name: name.to_string(),
            kind,
            references: None,
            validation: ValidationRule::default(),
        }
    }

    pub fn references(mut self, path_segment: &str) -> Self {
        self.references = Some(path_segment.to_string());
        self
    }

    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.validation = rule;
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub path_segment: String,
    /// Singular display name used in notifications, e.g. "Vendor".
    pub label: String,
    #[serde(default = "default_true")]
    pub paginated: bool,
    /// Envelope key holding the rows of a paginated list; "data" when absent.
    #[serde(default)]
    pub list_key: Option<String>,
    /// Query key the debounced search term is sent under.
    #[serde(default)]
    pub search_param: Option<String>,
    #[serde(default = "default_operations")]
    pub operations: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

fn default_true() -> bool {
    true
}

fn default_operations() -> Vec<String> {
    OPERATIONS.iter().map(|s| s.to_string()).collect()
}

/// Whole catalog, as loaded from JSON or built in.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub resources: Vec<ResourceConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_defaults_apply() {
        let raw = r#"{
            "resources": [
                { "path_segment": "vendors", "label": "Vendor",
                  "fields": [ { "name": "thumbnail", "kind": "upload" },
                              { "name": "name", "validation": { "required": true } } ] }
            ]
        }"#;
        let cfg: CatalogConfig = serde_json::from_str(raw).unwrap();
        let r = &cfg.resources[0];
        assert!(r.paginated);
        assert_eq!(r.operations.len(), OPERATIONS.len());
        assert_eq!(r.fields[0].kind, FieldKind::Upload);
        assert_eq!(r.fields[1].kind, FieldKind::Text);
        assert_eq!(r.fields[1].validation.required, Some(true));
    }
}
