//! Pre-flight validation of form payloads against the resource's field rules.

use crate::config::{FieldConfig, FieldKind, ResolvedResource, ValidationRule};
use crate::error::ClientError;
use crate::service::PreparedForm;
use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create payload. All required fields must be present and non-empty.
    pub fn validate(body: &Map<String, Value>, resource: &ResolvedResource) -> Result<(), ClientError> {
        Self::validate_with_pending(body, &[], resource)
    }

    /// Validate a form before its files are uploaded: fields waiting on an upload count as present.
    pub fn validate_prepared(
        prepared: &PreparedForm,
        resource: &ResolvedResource,
        partial: bool,
    ) -> Result<(), ClientError> {
        if partial {
            Self::validate_partial(&prepared.body, resource)
        } else {
            Self::validate_with_pending(&prepared.body, &prepared.pending_fields(), resource)
        }
    }

    fn validate_with_pending(
        body: &Map<String, Value>,
        pending: &[&str],
        resource: &ResolvedResource,
    ) -> Result<(), ClientError> {
        for field in &resource.fields {
            let val = body.get(&field.name);
            let uploading = pending.contains(&field.name.as_str());
            if field.validation.required == Some(true) && !uploading && is_blank(val) {
                return Err(ClientError::field(&field.name, format!("{} is required", field.name)));
            }
            if let Some(v) = val {
                validate_field(field, v)?;
            }
        }
        Ok(())
    }

    /// Validate only the fields present in body (for PATCH). Required is not enforced for missing
    /// fields, but a required field may not be blanked out.
    pub fn validate_partial(body: &Map<String, Value>, resource: &ResolvedResource) -> Result<(), ClientError> {
        for (name, v) in body {
            if let Some(field) = resource.field(name) {
                if field.validation.required == Some(true) && is_blank(Some(v)) {
                    return Err(ClientError::field(name, format!("{} is required", name)));
                }
                validate_field(field, v)?;
            }
        }
        Ok(())
    }
}

fn is_blank(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

fn validate_field(field: &FieldConfig, v: &Value) -> Result<(), ClientError> {
    if v.is_null() {
        return Ok(());
    }
    let col = field.name.as_str();
    validate_kind(col, v, &field.kind)?;
    let rule: &ValidationRule = &field.validation;
    if let Some(format) = &rule.format {
        validate_format(col, v, format)?;
    }
    if let Some(max) = rule.max_length {
        if let Some(s) = v.as_str() {
            if s.chars().count() > max as usize {
                return Err(ClientError::field(col, format!("{} must be at most {} characters", col, max)));
            }
        }
    }
    if let Some(min) = rule.min_length {
        if let Some(s) = v.as_str() {
            if s.chars().count() < min as usize {
                return Err(ClientError::field(col, format!("{} must be at least {} characters", col, min)));
            }
        }
    }
    if let Some(ref pattern) = rule.pattern {
        let re = Regex::new(pattern).map_err(|_| ClientError::field(col, format!("invalid pattern for {}", col)))?;
        if let Some(s) = v.as_str() {
            if !re.is_match(s) {
                return Err(ClientError::field(col, format!("{} does not match required pattern", col)));
            }
        }
    }
    if let Some(ref allowed) = rule.allowed {
        if !allowed.iter().any(|a| value_eq(v, a)) {
            return Err(ClientError::field(
                col,
                format!("{} must be one of: {:?}", col, allowed.iter().take(5).collect::<Vec<_>>()),
            ));
        }
    }
    if let Some(min) = rule.minimum {
        if let Some(n) = as_number(v) {
            if n < min {
                return Err(ClientError::field(col, format!("{} must be at least {}", col, min)));
            }
        }
    }
    if let Some(max) = rule.maximum {
        if let Some(n) = as_number(v) {
            if n > max {
                return Err(ClientError::field(col, format!("{} must be at most {}", col, max)));
            }
        }
    }
    Ok(())
}

/// Numbers typed into form inputs often arrive as strings.
fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn validate_kind(col: &str, v: &Value, kind: &FieldKind) -> Result<(), ClientError> {
    let ok = match kind {
        FieldKind::Text | FieldKind::Date | FieldKind::Upload => v.is_string(),
        FieldKind::Number => as_number(v).is_some(),
        FieldKind::Integer | FieldKind::Reference => match v {
            Value::Number(n) => n.is_i64() || n.is_u64(),
            Value::String(s) => s.trim().parse::<i64>().is_ok(),
            _ => false,
        },
        FieldKind::Boolean => match v {
            Value::Bool(_) => true,
            Value::String(s) => s == "true" || s == "false",
            _ => false,
        },
        FieldKind::ReferenceList => v.is_array(),
    };
    if ok {
        Ok(())
    } else {
        Err(ClientError::field(col, format!("{} has the wrong type", col)))
    }
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(s), Value::String(t)) => s == t,
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn validate_format(col: &str, v: &Value, format: &str) -> Result<(), ClientError> {
    let Some(s) = v.as_str() else {
        return Ok(());
    };
    match format.to_lowercase().as_str() {
        "date" => {
            // Accepts "2024-05-01" and full timestamps starting with a date.
            let day = s.get(..10).unwrap_or(s);
            if NaiveDate::parse_from_str(day, "%Y-%m-%d").is_err() {
                return Err(ClientError::field(col, format!("{} must be a date (YYYY-MM-DD)", col)));
            }
        }
        "url" => {
            if !(s.starts_with("http://") || s.starts_with("https://")) {
                return Err(ClientError::field(col, format!("{} must be an http(s) URL", col)));
            }
        }
        _ => {}
    }
    Ok(())
}
