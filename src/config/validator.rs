//! Catalog validation: identifiers, key columns, allow-lists and rules.

use crate::config::{CatalogConfig, ColumnType};
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static identifier pattern"))
}

/// Identifiers end up quoted inside SQL text, so only plain names are accepted.
pub fn check_identifier(s: &str) -> Result<(), ConfigError> {
    if identifier_re().is_match(s) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier(s.to_string()))
    }
}

pub fn validate(config: &CatalogConfig) -> Result<(), ConfigError> {
    if config.resources.is_empty() {
        return Err(ConfigError::Validation("at least one resource required".into()));
    }
    check_identifier(&config.schema)?;

    let mut names = HashSet::new();
    for r in &config.resources {
        check_identifier(&r.name)?;
        if !names.insert(r.name.as_str()) {
            return Err(ConfigError::DuplicateResource(r.name.clone()));
        }
        if let Some(t) = &r.table {
            check_identifier(t)?;
        }
        if let Some(s) = &r.schema {
            check_identifier(s)?;
        }

        let mut columns = HashSet::new();
        for c in &r.columns {
            check_identifier(&c.name)?;
            if !columns.insert(c.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate column {} in resource {}",
                    c.name, r.name
                )));
            }
        }

        let pk = r
            .columns
            .iter()
            .find(|c| c.name == r.primary_key)
            .ok_or_else(|| ConfigError::InvalidPrimaryKey {
                resource: r.name.clone(),
                column: r.primary_key.clone(),
            })?;
        if !matches!(
            pk.type_,
            ColumnType::BigSerial | ColumnType::BigInt | ColumnType::Uuid
        ) {
            return Err(ConfigError::InvalidPrimaryKey {
                resource: r.name.clone(),
                column: r.primary_key.clone(),
            });
        }

        let non_key = |name: &str| name != r.primary_key && columns.contains(name);
        for c in r.create_columns.iter().flatten() {
            if !non_key(c) {
                return Err(ConfigError::MissingReference {
                    resource: r.name.clone(),
                    kind: "create column",
                    name: c.clone(),
                });
            }
        }
        for (col, rule) in &r.validation {
            if !non_key(col) {
                return Err(ConfigError::MissingReference {
                    resource: r.name.clone(),
                    kind: "validation column",
                    name: col.clone(),
                });
            }
            if let Some(p) = &rule.pattern {
                Regex::new(p).map_err(|e| {
                    ConfigError::Validation(format!("invalid pattern for {}.{}: {}", r.name, col, e))
                })?;
            }
        }
    }
    Ok(())
}
