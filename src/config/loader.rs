//! Build the resolved catalog from in-memory config, the built-in resource set, or a JSON file.

use crate::config::resolved::{Catalog, ResolvedResource};
use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Build resolved catalog from config (validates first).
pub fn resolve(config: &CatalogConfig) -> Result<Catalog, ConfigError> {
    validate(config)?;

    let mut resources = Vec::with_capacity(config.resources.len());
    let mut resource_by_path = HashMap::new();
    for r in &config.resources {
        let resolved = Arc::new(ResolvedResource::from_fields(
            r.path_segment.clone(),
            r.label.clone(),
            r.paginated,
            r.list_key.clone(),
            r.search_param.clone(),
            r.operations.clone(),
            r.fields.clone(),
        ));
        resource_by_path.insert(r.path_segment.clone(), resolved.clone());
        resources.push(resolved);
    }

    Ok(Catalog {
        resources,
        resource_by_path,
    })
}

/// Read a catalog JSON file (`{ "resources": [...] }`).
pub async fn load_catalog_from_path(path: &Path) -> Result<CatalogConfig, ConfigError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}

fn text(name: &str, max_length: u32) -> FieldConfig {
    FieldConfig::new(name, FieldKind::Text).rule(ValidationRule {
        max_length: Some(max_length),
        ..Default::default()
    })
}

fn required_text(name: &str, max_length: u32) -> FieldConfig {
    FieldConfig::new(name, FieldKind::Text).rule(ValidationRule {
        required: Some(true),
        min_length: Some(1),
        max_length: Some(max_length),
        ..Default::default()
    })
}

fn number(kind: FieldKind, name: &str, minimum: Option<f64>, maximum: Option<f64>) -> FieldConfig {
    FieldConfig::new(name, kind).rule(ValidationRule {
        minimum,
        maximum,
        ..Default::default()
    })
}

fn date(name: &str) -> FieldConfig {
    FieldConfig::new(name, FieldKind::Date).rule(ValidationRule {
        format: Some("date".into()),
        ..Default::default()
    })
}

fn thumbnail() -> FieldConfig {
    FieldConfig::new("thumbnail", FieldKind::Upload).rule(ValidationRule {
        format: Some("url".into()),
        ..Default::default()
    })
}

fn resource(path_segment: &str, label: &str, fields: Vec<FieldConfig>) -> ResourceConfig {
    ResourceConfig {
        path_segment: path_segment.into(),
        label: label.into(),
        paginated: true,
        list_key: None,
        search_param: None,
        operations: OPERATIONS.iter().map(|s| s.to_string()).collect(),
        fields,
    }
}

/// The five resources of the back office: vendors, categories, products, discounts, discount codes.
pub fn builtin_catalog() -> CatalogConfig {
    let vendors = ResourceConfig {
        paginated: false,
        ..resource("vendors", "Vendor", vec![required_text("name", 255), thumbnail()])
    };
    let categories = ResourceConfig {
        paginated: false,
        ..resource("categories", "Category", vec![required_text("name", 255), thumbnail()])
    };
    let products = ResourceConfig {
        search_param: Some("name".into()),
        ..resource(
            "products",
            "Product",
            vec![
                required_text("name", 255),
                text("desc", 2000),
                number(FieldKind::Number, "price", Some(0.0), None),
                thumbnail(),
                FieldConfig::new("vendorId", FieldKind::Reference).references("vendors"),
                FieldConfig::new("categoryId", FieldKind::Reference).references("categories"),
                number(FieldKind::Number, "rating", Some(0.0), Some(5.0)),
            ],
        )
    };
    let discounts = ResourceConfig {
        list_key: Some("discounts".into()),
        search_param: Some("search".into()),
        ..resource(
            "discounts",
            "Discount",
            vec![
                required_text("name", 255),
                text("desc", 2000),
                number(FieldKind::Number, "percentage", Some(0.0), Some(100.0)),
                date("startDate"),
                date("endDate"),
                FieldConfig::new("productIds", FieldKind::ReferenceList).references("products"),
                FieldConfig::new("active", FieldKind::Boolean),
            ],
        )
    };
    let discount_codes = ResourceConfig {
        search_param: Some("code".into()),
        ..resource(
            "discount-codes",
            "Discount code",
            vec![
                text("description", 2000),
                number(FieldKind::Number, "minAmount", Some(0.0), None),
                number(FieldKind::Number, "discountRate", Some(0.0), Some(100.0)),
                FieldConfig::new("productIds", FieldKind::ReferenceList).references("products"),
                number(FieldKind::Integer, "numberCodeApply", Some(0.0), None),
                FieldConfig::new("isActive", FieldKind::Boolean),
                text("code", 64),
            ],
        )
    };

    CatalogConfig {
        resources: vec![vendors, categories, products, discounts, discount_codes],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_resolves() {
        let catalog = resolve(&builtin_catalog()).unwrap();
        assert_eq!(catalog.resources.len(), 5);

        let vendors = catalog.resource("vendors").unwrap();
        assert!(!vendors.paginated);
        assert_eq!(vendors.upload_fields, vec!["thumbnail".to_string()]);

        let discounts = catalog.resource("discounts").unwrap();
        assert_eq!(discounts.list_key, "discounts");
        assert_eq!(discounts.search_param.as_deref(), Some("search"));

        let codes = catalog.resource("discount-codes").unwrap();
        assert_eq!(codes.list_key, "data");
        assert_eq!(codes.collection_name(), "discount codes");
        assert!(codes.allows("delete"));
    }

    #[tokio::test]
    async fn missing_catalog_file_is_a_load_error() {
        let err = load_catalog_from_path(Path::new("/nonexistent/catalog.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
