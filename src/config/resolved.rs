//! Resolved catalog: validated and flattened for runtime use.

use crate::config::{FieldConfig, FieldKind, ValidationRule};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct ResolvedResource {
    pub path_segment: String,
    pub label: String,
    pub paginated: bool,
    pub list_key: String,
    pub search_param: Option<String>,
    pub operations: Vec<String>,
    pub fields: Vec<FieldConfig>,
    /// Names of fields fed by the upload pipeline.
    pub upload_fields: Vec<String>,
    pub validation: HashMap<String, ValidationRule>,
}

impl ResolvedResource {
    pub fn allows(&self, operation: &str) -> bool {
        self.operations.iter().any(|o| o == operation)
    }

    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_upload_field(&self, name: &str) -> bool {
        self.upload_fields.iter().any(|f| f == name)
    }

    /// Plural name for messages: "discount-codes" -> "discount codes".
    pub fn collection_name(&self) -> String {
        self.path_segment.replace('-', " ")
    }

    pub(crate) fn from_fields(
        path_segment: String,
        label: String,
        paginated: bool,
        list_key: Option<String>,
        search_param: Option<String>,
        operations: Vec<String>,
        fields: Vec<FieldConfig>,
    ) -> Self {
        let upload_fields = fields
            .iter()
            .filter(|f| f.kind == FieldKind::Upload)
            .map(|f| f.name.clone())
            .collect();
        let validation = fields
            .iter()
            .map(|f| (f.name.clone(), f.validation.clone()))
            .collect();
        ResolvedResource {
            path_segment,
            label,
            paginated,
            list_key: list_key.unwrap_or_else(|| "data".to_string()),
            search_param,
            operations,
            fields,
            upload_fields,
            validation,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub resources: Vec<Arc<ResolvedResource>>,
    pub resource_by_path: HashMap<String, Arc<ResolvedResource>>,
}

impl Catalog {
    pub fn resource(&self, path: &str) -> Option<Arc<ResolvedResource>> {
        self.resource_by_path.get(path).cloned()
    }
}
