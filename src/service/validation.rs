//! Request validation from catalog rules.

use crate::config::ValidationRule;
use crate::error::AppError;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate body against per-column rules. All required fields must be present.
    pub fn validate(
        body: &Map<String, Value>,
        rules: &HashMap<String, ValidationRule>,
    ) -> Result<(), AppError> {
        for (col, rule) in rules {
            let val = body.get(col);
            if rule.required == Some(true) && val.map_or(true, Value::is_null) {
                return Err(AppError::Validation(format!("{} is required", col)));
            }
            if let Some(v) = val {
                validate_field(col, v, rule)?;
            }
        }
        Ok(())
    }

    /// Validate only the fields present in body (for updates). Required is not enforced for missing fields.
    pub fn validate_partial(
        body: &Map<String, Value>,
        rules: &HashMap<String, ValidationRule>,
    ) -> Result<(), AppError> {
        for (col, v) in body {
            if let Some(rule) = rules.get(col) {
                if rule.required == Some(true) && v.is_null() {
                    return Err(AppError::Validation(format!("{} is required", col)));
                }
                validate_field(col, v, rule)?;
            }
        }
        Ok(())
    }
}

fn validate_field(col: &str, v: &Value, rule: &ValidationRule) -> Result<(), AppError> {
    if v.is_null() {
        return Ok(());
    }
    if let Some(s) = v.as_str() {
        let len = s.chars().count();
        if let Some(max) = rule.max_length {
            if len > max as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    col, max
                )));
            }
        }
        if let Some(min) = rule.min_length {
            if len < min as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at least {} characters",
                    col, min
                )));
            }
        }
        if let Some(ref pattern) = rule.pattern {
            let re = Regex::new(pattern)
                .map_err(|_| AppError::Validation(format!("invalid pattern for {}", col)))?;
            if !re.is_match(s) {
                return Err(AppError::Validation(format!(
                    "{} does not match required pattern",
                    col
                )));
            }
        }
    }
    if let Some(ref allowed) = rule.allowed {
        if !allowed.iter().any(|a| a == v) {
            let shown: Vec<String> = allowed.iter().map(Value::to_string).collect();
            return Err(AppError::Validation(format!(
                "{} must be one of: {}",
                col,
                shown.join(", ")
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules() -> HashMap<String, ValidationRule> {
        serde_json::from_value(json!({
            "title": { "required": true, "min_length": 1, "max_length": 5 },
            "priority": { "allowed": ["low", "medium", "high"] },
            "color": { "pattern": "^#[0-9a-fA-F]{6}$" }
        }))
        .unwrap()
    }

    fn body(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn required_fields_on_create() {
        let err = RequestValidator::validate(&body(json!({ "priority": "low" })), &rules()).unwrap_err();
        assert_eq!(err.to_string(), "title is required");
        RequestValidator::validate(&body(json!({ "title": "x" })), &rules()).unwrap();
    }

    #[test]
    fn partial_skips_missing_required() {
        RequestValidator::validate_partial(&body(json!({ "priority": "high" })), &rules()).unwrap();
        assert!(
            RequestValidator::validate_partial(&body(json!({ "title": null })), &rules()).is_err()
        );
    }

    #[test]
    fn allowed_values() {
        let err = RequestValidator::validate_partial(&body(json!({ "priority": "urgent" })), &rules())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"priority must be one of: "low", "medium", "high""#
        );
    }

    #[test]
    fn lengths_count_characters() {
        RequestValidator::validate_partial(&body(json!({ "title": "ünïcø" })), &rules()).unwrap();
        assert!(
            RequestValidator::validate_partial(&body(json!({ "title": "" })), &rules()).is_err()
        );
        assert!(
            RequestValidator::validate_partial(&body(json!({ "title": "toolong" })), &rules()).is_err()
        );
    }

    #[test]
    fn patterns() {
        RequestValidator::validate_partial(&body(json!({ "color": "#3B82F6" })), &rules()).unwrap();
        assert!(
            RequestValidator::validate_partial(&body(json!({ "color": "blue" })), &rules()).is_err()
        );
    }
}
