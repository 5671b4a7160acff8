//! Load the resource catalog (built-in or from a JSON file) and resolve it.

use crate::config::resolved::{
    ColumnDefault, ColumnInfo, DefaultValue, PkType, ResolvedCatalog, ResolvedResource,
};
use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use crate::sql::CellValue;
use std::collections::HashMap;
use std::path::Path;

/// The TaskFlow catalog (tasks, categories) compiled into the binary.
const BUILTIN_CATALOG: &str = include_str!("../../resources/taskflow.json");

pub fn builtin_catalog() -> Result<CatalogConfig, ConfigError> {
    parse_catalog(BUILTIN_CATALOG)
}

pub fn parse_catalog(json: &str) -> Result<CatalogConfig, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

/// Read the catalog from `path` when given, else the built-in one, and resolve it.
pub async fn load_catalog(path: Option<&Path>) -> Result<ResolvedCatalog, ConfigError> {
    let config = match path {
        Some(p) => {
            let raw = tokio::fs::read_to_string(p)
                .await
                .map_err(|e| ConfigError::Load(format!("{}: {}", p.display(), e)))?;
            parse_catalog(&raw)?
        }
        None => builtin_catalog()?,
    };
    resolve(&config)
}

/// Build resolved catalog from config (validates first).
pub fn resolve(config: &CatalogConfig) -> Result<ResolvedCatalog, ConfigError> {
    validate(config)?;

    let mut resources = Vec::with_capacity(config.resources.len());
    let mut by_name = HashMap::new();

    for r in &config.resources {
        let columns: Vec<ColumnInfo> = r
            .columns
            .iter()
            .map(|c| ColumnInfo {
                name: c.name.clone(),
                type_: c.type_,
                nullable: c.nullable && c.name != r.primary_key,
                default: resolve_default(c),
            })
            .collect();
        let pk_index = columns
            .iter()
            .position(|c| c.name == r.primary_key)
            .ok_or_else(|| ConfigError::InvalidPrimaryKey {
                resource: r.name.clone(),
                column: r.primary_key.clone(),
            })?;
        let pk_type = match columns[pk_index].type_ {
            ColumnType::Uuid => PkType::Uuid,
            _ => PkType::BigInt,
        };
        let create_columns = match &r.create_columns {
            Some(list) => list.clone(),
            None => columns
                .iter()
                .filter(|c| c.name != r.primary_key)
                .map(|c| c.name.clone())
                .collect(),
        };

        by_name.insert(r.name.clone(), resources.len());
        resources.push(ResolvedResource {
            name: r.name.clone(),
            schema_name: r.schema.clone().unwrap_or_else(|| config.schema.clone()),
            table_name: r.table.clone().unwrap_or_else(|| r.name.clone()),
            pk_column: r.primary_key.clone(),
            pk_type,
            pk_index,
            columns,
            create_columns,
            validation: r.validation.clone(),
        });
    }

    Ok(ResolvedCatalog { resources, by_name })
}

fn resolve_default(c: &ColumnConfig) -> Option<ColumnDefault> {
    if c.type_ == ColumnType::BigSerial {
        return Some(ColumnDefault {
            sql: None,
            value: DefaultValue::Generated,
        });
    }
    let sql = c.default.as_ref()?;
    Some(ColumnDefault {
        sql: Some(sql.clone()),
        value: default_value(c.type_, sql),
    })
}

/// Interprets the common default expressions so stores other than PostgreSQL can apply them.
fn default_value(type_: ColumnType, sql: &str) -> DefaultValue {
    let s = sql.trim();
    let lower = s.to_ascii_lowercase();
    match lower.as_str() {
        "now()" | "current_timestamp" | "current_date" => return DefaultValue::Now,
        "gen_random_uuid()" | "uuid_generate_v4()" => return DefaultValue::Generated,
        "null" => return DefaultValue::Literal(CellValue::Null(type_)),
        _ => {}
    }
    match type_ {
        ColumnType::Boolean => match lower.as_str() {
            "true" => DefaultValue::Literal(CellValue::Bool(true)),
            "false" => DefaultValue::Literal(CellValue::Bool(false)),
            _ => DefaultValue::Expression,
        },
        ColumnType::BigInt => s
            .parse::<i64>()
            .map(|n| DefaultValue::Literal(CellValue::BigInt(n)))
            .unwrap_or(DefaultValue::Expression),
        ColumnType::Text => match s.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
            Some(inner) => DefaultValue::Literal(CellValue::Text(inner.replace("''", "'"))),
            None => DefaultValue::Expression,
        },
        _ => DefaultValue::Expression,
    }
}
