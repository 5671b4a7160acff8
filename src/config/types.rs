//! Raw resource descriptor types matching the catalog JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column type as written in a descriptor. Only the types the service can bind and decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[serde(alias = "serial8")]
    BigSerial,
    #[serde(alias = "int8")]
    BigInt,
    #[serde(alias = "varchar")]
    Text,
    #[serde(alias = "bool")]
    Boolean,
    Date,
    #[serde(alias = "timestamp with time zone")]
    Timestamptz,
    Uuid,
}

impl ColumnType {
    /// PostgreSQL type used in DDL.
    pub fn sql_name(self) -> &'static str {
        match self {
            ColumnType::BigSerial => "BIGSERIAL",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Text => "TEXT",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::Timestamptz => "TIMESTAMPTZ",
            ColumnType::Uuid => "UUID",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: ColumnType,
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// SQL default expression, e.g. `now()`, `false`, `'medium'`.
    #[serde(default)]
    pub default: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<serde_json::Value>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// URL segment under /api and the noun used in messages ("tasks not found").
    pub name: String,
    /// Table name; defaults to `name`.
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    pub columns: Vec<ColumnConfig>,
    /// Columns a create may populate, in bind order. Defaults to every non-key column.
    #[serde(default)]
    pub create_columns: Option<Vec<String>>,
    #[serde(default)]
    pub validation: HashMap<String, ValidationRule>,
}

fn default_primary_key() -> String {
    "id".into()
}

/// All resources served by one process.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_schema")]
    pub schema: String,
    pub resources: Vec<ResourceConfig>,
}

fn default_schema() -> String {
    "public".into()
}
