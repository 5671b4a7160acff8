//! Resolved resource model: descriptors validated and flattened for runtime use.

use crate::config::{ColumnType, ValidationRule};
use crate::sql::CellValue;
use std::collections::HashMap;

/// Primary key type for parsing path ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkType {
    BigInt,
    Uuid,
}

impl PkType {
    /// Parses a path segment. `None` means no row can carry this id.
    pub fn parse(self, s: &str) -> Option<CellValue> {
        match self {
            PkType::BigInt => s.parse::<i64>().ok().map(CellValue::BigInt),
            PkType::Uuid => uuid::Uuid::parse_str(s).ok().map(CellValue::Uuid),
        }
    }
}

/// What a column default evaluates to when a create omits the column.
#[derive(Clone, Debug, PartialEq)]
pub enum DefaultValue {
    /// Assigned by the store (sequence or generated uuid).
    Generated,
    Now,
    Literal(CellValue),
    /// An expression only the database understands.
    Expression,
}

#[derive(Clone, Debug)]
pub struct ColumnDefault {
    /// Expression used verbatim in DDL.
    pub sql: Option<String>,
    pub value: DefaultValue,
}

#[derive(Clone, Debug)]
pub struct ColumnInfo {
    pub name: String,
    pub type_: ColumnType,
    pub nullable: bool,
    pub default: Option<ColumnDefault>,
}

impl ColumnInfo {
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedResource {
    pub name: String,
    pub schema_name: String,
    pub table_name: String,
    pub pk_column: String,
    pub pk_type: PkType,
    /// Index of the key column in `columns`.
    pub pk_index: usize,
    pub columns: Vec<ColumnInfo>,
    /// Create allow-list in bind order.
    pub create_columns: Vec<String>,
    pub validation: HashMap<String, ValidationRule>,
}

impl ResolvedResource {
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn pk(&self) -> &ColumnInfo {
        &self.columns[self.pk_index]
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedCatalog {
    pub resources: Vec<ResolvedResource>,
    pub by_name: HashMap<String, usize>,
}

impl ResolvedCatalog {
    pub fn resource(&self, name: &str) -> Option<&ResolvedResource> {
        self.by_name.get(name).map(|&i| &self.resources[i])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|r| r.name.as_str())
    }
}
