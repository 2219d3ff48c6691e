//! Catalog validation: referential integrity and operation names.

use crate::config::{CatalogConfig, FieldKind, OPERATIONS};
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;

pub fn validate(config: &CatalogConfig) -> Result<(), ConfigError> {
    let mut path_segments = HashSet::new();
    for r in &config.resources {
        if r.path_segment.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "resource '{}' has an empty path segment",
                r.label
            )));
        }
        if !path_segments.insert(r.path_segment.as_str()) {
            return Err(ConfigError::DuplicatePathSegment(r.path_segment.clone()));
        }
    }

    for r in &config.resources {
        for op in &r.operations {
            if !OPERATIONS.contains(&op.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "{}: unknown operation '{}'",
                    r.path_segment, op
                )));
            }
        }
        if let Some(param) = &r.search_param {
            if param.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{}: search_param must not be empty",
                    r.path_segment
                )));
            }
        }

        let mut field_names = HashSet::new();
        for f in &r.fields {
            if !field_names.insert(f.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "{}: duplicate field '{}'",
                    r.path_segment, f.name
                )));
            }
            let is_reference = matches!(f.kind, FieldKind::Reference | FieldKind::ReferenceList);
            match (&f.references, is_reference) {
                (Some(target), _) if !path_segments.contains(target.as_str()) => {
                    return Err(ConfigError::MissingReference {
                        kind: "resource",
                        id: target.clone(),
                    });
                }
                (None, true) => {
                    return Err(ConfigError::Validation(format!(
                        "{}.{}: reference field needs 'references'",
                        r.path_segment, f.name
                    )));
                }
                _ => {}
            }
            if let Some(pattern) = &f.validation.pattern {
                Regex::new(pattern).map_err(|e| {
                    ConfigError::Validation(format!("{}.{}: invalid pattern: {}", r.path_segment, f.name, e))
                })?;
            }
        }
    }

    Ok(())
}
