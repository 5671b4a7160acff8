//! In-process store for development and tests. Same contract as `PgStore`:
//! ids come from a per-table counter and are never reused, rows list in key order.

use crate::config::{ColumnType, DefaultValue, ResolvedResource};
use crate::error::AppError;
use crate::sql::CellValue;
use crate::store::RowStore;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum RowKey {
    Int(i64),
    Uuid(uuid::Uuid),
}

impl RowKey {
    fn of(v: &CellValue) -> Option<Self> {
        match v {
            CellValue::BigInt(n) => Some(RowKey::Int(*n)),
            CellValue::Uuid(u) => Some(RowKey::Uuid(*u)),
            _ => None,
        }
    }
}

#[derive(Default)]
struct MemoryTable {
    last_id: i64,
    /// Cells in the resource's column order.
    rows: BTreeMap<RowKey, Vec<CellValue>>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, MemoryTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, MemoryTable>> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn table_key(resource: &ResolvedResource) -> String {
    format!("{}.{}", resource.schema_name, resource.table_name)
}

fn to_json(resource: &ResolvedResource, cells: &[CellValue]) -> Value {
    let map: Map<String, Value> = resource
        .columns
        .iter()
        .zip(cells)
        .map(|(c, v)| (c.name.clone(), v.to_json()))
        .collect();
    Value::Object(map)
}

fn constraint(resource: &ResolvedResource, operation: &'static str, msg: String) -> AppError {
    AppError::store(&resource.name, operation, sqlx::Error::Protocol(msg))
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn list(&self, resource: &ResolvedResource) -> Result<Vec<Value>, AppError> {
        let tables = self.lock();
        Ok(tables
            .get(&table_key(resource))
            .map(|t| t.rows.values().map(|r| to_json(resource, r)).collect())
            .unwrap_or_default())
    }

    async fn get(&self, resource: &ResolvedResource, id: &CellValue) -> Result<Option<Value>, AppError> {
        let tables = self.lock();
        let Some(key) = RowKey::of(id) else { return Ok(None) };
        Ok(tables
            .get(&table_key(resource))
            .and_then(|t| t.rows.get(&key))
            .map(|r| to_json(resource, r)))
    }

    async fn insert(
        &self,
        resource: &ResolvedResource,
        values: &[(String, CellValue)],
    ) -> Result<Value, AppError> {
        let mut tables = self.lock();
        let table = tables.entry(table_key(resource)).or_default();
        let now = chrono::Utc::now();

        let mut cells = Vec::with_capacity(resource.columns.len());
        for (i, c) in resource.columns.iter().enumerate() {
            let given = values.iter().find(|(name, _)| *name == c.name).map(|(_, v)| v.clone());
            let cell = match given {
                Some(v) => v,
                None => match c.default.as_ref().map(|d| &d.value) {
                    Some(DefaultValue::Generated) if i == resource.pk_index => match c.type_ {
                        ColumnType::Uuid => CellValue::Uuid(uuid::Uuid::new_v4()),
                        _ => CellValue::BigInt(table.last_id + 1),
                    },
                    Some(DefaultValue::Now) => match c.type_ {
                        ColumnType::Date => CellValue::Date(now.date_naive()),
                        _ => CellValue::Timestamp(now),
                    },
                    Some(DefaultValue::Literal(v)) => v.clone(),
                    _ => CellValue::Null(c.type_),
                },
            };
            if cell.is_null() && !c.nullable {
                return Err(constraint(
                    resource,
                    "create",
                    format!("null value in column \"{}\" violates not-null constraint", c.name),
                ));
            }
            cells.push(cell);
        }

        let key = RowKey::of(&cells[resource.pk_index])
            .ok_or_else(|| constraint(resource, "create", "unsupported key value".into()))?;
        if table.rows.contains_key(&key) {
            return Err(constraint(resource, "create", "duplicate key value".into()));
        }
        if let RowKey::Int(n) = key {
            table.last_id = table.last_id.max(n);
        }
        let row = to_json(resource, &cells);
        table.rows.insert(key, cells);
        Ok(row)
    }

    async fn update(
        &self,
        resource: &ResolvedResource,
        id: &CellValue,
        changes: &[(String, CellValue)],
    ) -> Result<Option<Value>, AppError> {
        let mut tables = self.lock();
        let Some(key) = RowKey::of(id) else { return Ok(None) };
        let Some(cells) = tables
            .get_mut(&table_key(resource))
            .and_then(|t| t.rows.get_mut(&key))
        else {
            return Ok(None);
        };
        let mut next = cells.clone();
        for (name, v) in changes {
            let Some(i) = resource.columns.iter().position(|c| c.name == *name) else {
                return Err(constraint(resource, "update", format!("column \"{}\" does not exist", name)));
            };
            if i == resource.pk_index {
                return Err(constraint(resource, "update", "key columns are immutable".into()));
            }
            if v.is_null() && !resource.columns[i].nullable {
                return Err(constraint(
                    resource,
                    "update",
                    format!("null value in column \"{}\" violates not-null constraint", name),
                ));
            }
            next[i] = v.clone();
        }
        *cells = next;
        Ok(Some(to_json(resource, cells)))
    }

    async fn delete(&self, resource: &ResolvedResource, id: &CellValue) -> Result<Option<Value>, AppError> {
        let mut tables = self.lock();
        let Some(key) = RowKey::of(id) else { return Ok(None) };
        Ok(tables
            .get_mut(&table_key(resource))
            .and_then(|t| t.rows.remove(&key))
            .map(|r| to_json(resource, &r)))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{builtin_catalog, resolve, ResolvedCatalog};
    use serde_json::json;

    fn catalog() -> ResolvedCatalog {
        resolve(&builtin_catalog().unwrap()).unwrap()
    }

    fn title(t: &str) -> Vec<(String, CellValue)> {
        vec![("title".to_string(), CellValue::Text(t.into()))]
    }

    #[tokio::test]
    async fn ids_are_sequential_and_never_reused() {
        let c = catalog();
        let tasks = c.resource("tasks").unwrap();
        let store = MemoryStore::new();

        let a = store.insert(tasks, &title("a")).await.unwrap();
        let b = store.insert(tasks, &title("b")).await.unwrap();
        assert_eq!(a["id"], json!(1));
        assert_eq!(b["id"], json!(2));

        store.delete(tasks, &CellValue::BigInt(2)).await.unwrap();
        let c3 = store.insert(tasks, &title("c")).await.unwrap();
        assert_eq!(c3["id"], json!(3));
    }

    #[tokio::test]
    async fn applies_column_defaults() {
        let c = catalog();
        let tasks = c.resource("tasks").unwrap();
        let store = MemoryStore::new();
        let row = store.insert(tasks, &title("a")).await.unwrap();
        assert_eq!(row["completed"], json!(false));
        assert_eq!(row["priority"], json!("medium"));
        assert_eq!(row["description"], Value::Null);
        assert!(row["created_at"].is_string());
    }

    #[tokio::test]
    async fn tables_are_isolated_per_resource() {
        let c = catalog();
        let store = MemoryStore::new();
        store.insert(c.resource("tasks").unwrap(), &title("a")).await.unwrap();
        let categories = store.list(c.resource("categories").unwrap()).await.unwrap();
        assert!(categories.is_empty());
    }

    #[tokio::test]
    async fn missing_rows_are_none() {
        let c = catalog();
        let tasks = c.resource("tasks").unwrap();
        let store = MemoryStore::new();
        let id = CellValue::BigInt(42);
        assert!(store.get(tasks, &id).await.unwrap().is_none());
        assert!(store.update(tasks, &id, &title("x")).await.unwrap().is_none());
        assert!(store.delete(tasks, &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn not_null_columns_are_enforced() {
        let c = catalog();
        let tasks = c.resource("tasks").unwrap();
        let store = MemoryStore::new();
        let err = store.insert(tasks, &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Store { operation: "create", .. }));
    }
}
