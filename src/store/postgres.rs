//! PostgreSQL store: executes builder output on a shared pool.

use crate::config::{ColumnType, ResolvedResource};
use crate::error::AppError;
use crate::sql::{self, format_date, format_timestamp, CellValue, QueryBuf};
use crate::store::RowStore;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    async fn fetch_optional(
        &self,
        resource: &ResolvedResource,
        operation: &'static str,
        q: &QueryBuf,
    ) -> Result<Option<Value>, AppError> {
        tracing::debug!(resource = %resource.name, operation, sql = %q.sql, params = q.params.len(), "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = p.bind_to(query);
        }
        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::store(&resource.name, operation, e))?;
        row.map(|r| row_to_json(resource, &r))
            .transpose()
            .map_err(|e| AppError::store(&resource.name, operation, e))
    }
}

#[async_trait]
impl RowStore for PgStore {
    async fn list(&self, resource: &ResolvedResource) -> Result<Vec<Value>, AppError> {
        let q = sql::select_list(resource);
        tracing::debug!(resource = %resource.name, operation = "list", sql = %q.sql, "query");
        let rows = sqlx::query(&q.sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::store(&resource.name, "list", e))?;
        rows.iter()
            .map(|r| row_to_json(resource, r))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::store(&resource.name, "list", e))
    }

    async fn get(&self, resource: &ResolvedResource, id: &CellValue) -> Result<Option<Value>, AppError> {
        self.fetch_optional(resource, "get", &sql::select_by_id(resource, id))
            .await
    }

    async fn insert(
        &self,
        resource: &ResolvedResource,
        values: &[(String, CellValue)],
    ) -> Result<Value, AppError> {
        self.fetch_optional(resource, "create", &sql::insert(resource, values))
            .await?
            .ok_or_else(|| AppError::store(&resource.name, "create", sqlx::Error::RowNotFound))
    }

    async fn update(
        &self,
        resource: &ResolvedResource,
        id: &CellValue,
        changes: &[(String, CellValue)],
    ) -> Result<Option<Value>, AppError> {
        self.fetch_optional(resource, "update", &sql::update(resource, id, changes))
            .await
    }

    async fn delete(&self, resource: &ResolvedResource, id: &CellValue) -> Result<Option<Value>, AppError> {
        self.fetch_optional(resource, "delete", &sql::delete(resource, id))
            .await
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Decodes each declared column by its type; the select list is exactly the resource's columns.
fn row_to_json(resource: &ResolvedResource, row: &PgRow) -> Result<Value, sqlx::Error> {
    let mut map = Map::new();
    for c in &resource.columns {
        let name = c.name.as_str();
        let v = match c.type_ {
            ColumnType::BigSerial | ColumnType::BigInt => row
                .try_get::<Option<i64>, _>(name)?
                .map(|n| Value::Number(n.into())),
            ColumnType::Text => row.try_get::<Option<String>, _>(name)?.map(Value::String),
            ColumnType::Boolean => row.try_get::<Option<bool>, _>(name)?.map(Value::Bool),
            ColumnType::Date => row
                .try_get::<Option<chrono::NaiveDate>, _>(name)?
                .map(|d| Value::String(format_date(&d))),
            ColumnType::Timestamptz => row
                .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name)?
                .map(|t| Value::String(format_timestamp(&t))),
            ColumnType::Uuid => row
                .try_get::<Option<uuid::Uuid>, _>(name)?
                .map(|u| Value::String(u.to_string())),
        };
        map.insert(name.to_string(), v.unwrap_or(Value::Null));
    }
    Ok(Value::Object(map))
}
