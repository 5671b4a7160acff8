//! Generic CRUD over any catalog resource: request bodies are checked against the
//! resource schema and coerced to typed values before reaching a store.

use crate::case::object_keys_to_snake_case;
use crate::config::{ColumnInfo, ResolvedResource};
use crate::error::AppError;
use crate::service::RequestValidator;
use crate::sql::CellValue;
use crate::store::RowStore;
use serde_json::{Map, Value};

pub struct CrudService;

impl CrudService {
    /// All rows ordered by primary key.
    pub async fn list(store: &dyn RowStore, resource: &ResolvedResource) -> Result<Vec<Value>, AppError> {
        store.list(resource).await
    }

    pub async fn read(
        store: &dyn RowStore,
        resource: &ResolvedResource,
        id_str: &str,
    ) -> Result<Value, AppError> {
        let id = parse_id(resource, id_str)?;
        store
            .get(resource, &id)
            .await?
            .ok_or_else(|| AppError::not_found(&resource.name))
    }

    /// Insert one row from the create allow-list. Returns created row.
    pub async fn create(
        store: &dyn RowStore,
        resource: &ResolvedResource,
        body: Value,
    ) -> Result<Value, AppError> {
        let body = prepare_body(resource, body)?;
        for key in body.keys() {
            known_column(resource, key)?;
            if !resource.create_columns.iter().any(|c| c == key) {
                return Err(AppError::BadRequest(format!(
                    "column '{}' cannot be set when creating {}",
                    key, resource.name
                )));
            }
        }
        RequestValidator::validate(&body, &resource.validation)?;

        let mut values = Vec::with_capacity(resource.create_columns.len());
        for name in &resource.create_columns {
            let col = known_column(resource, name)?;
            match body.get(name) {
                Some(v) => values.push((name.clone(), coerce(col, v)?)),
                None if col.has_default() => {}
                None if col.nullable => values.push((name.clone(), CellValue::Null(col.type_))),
                None => return Err(AppError::Validation(format!("{} is required", name))),
            }
        }
        store.insert(resource, &values).await
    }

    /// Partial update: exactly the supplied columns are written.
    pub async fn update(
        store: &dyn RowStore,
        resource: &ResolvedResource,
        id_str: &str,
        body: Value,
    ) -> Result<Value, AppError> {
        let id = parse_id(resource, id_str)?;
        let body = prepare_body(resource, body)?;
        let mut changes = Vec::with_capacity(body.len());
        for (key, v) in &body {
            let col = known_column(resource, key)?;
            changes.push((key.clone(), coerce(col, v)?));
        }
        RequestValidator::validate_partial(&body, &resource.validation)?;
        store
            .update(resource, &id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found(&resource.name))
    }

    /// Delete one row by id. Returns the deleted row.
    pub async fn delete(
        store: &dyn RowStore,
        resource: &ResolvedResource,
        id_str: &str,
    ) -> Result<Value, AppError> {
        let id = parse_id(resource, id_str)?;
        store
            .delete(resource, &id)
            .await?
            .ok_or_else(|| AppError::not_found(&resource.name))
    }
}

/// An id that does not parse for the key type cannot match any row.
fn parse_id(resource: &ResolvedResource, id_str: &str) -> Result<CellValue, AppError> {
    resource
        .pk_type
        .parse(id_str)
        .ok_or_else(|| AppError::not_found(&resource.name))
}

/// Object body with snake_case keys and the primary key removed (it is read-only).
fn prepare_body(resource: &ResolvedResource, body: Value) -> Result<Map<String, Value>, AppError> {
    let Value::Object(map) = body else {
        return Err(AppError::BadRequest("body must be a JSON object".into()));
    };
    let mut map = object_keys_to_snake_case(map);
    map.remove(&resource.pk_column);
    Ok(map)
}

fn known_column<'a>(resource: &'a ResolvedResource, key: &str) -> Result<&'a ColumnInfo, AppError> {
    resource.column(key).ok_or_else(|| {
        AppError::BadRequest(format!("unknown column '{}' for {}", key, resource.name))
    })
}

fn coerce(col: &ColumnInfo, v: &Value) -> Result<CellValue, AppError> {
    let cell = CellValue::from_json(col.type_, v)
        .map_err(|msg| AppError::Validation(format!("{} {}", col.name, msg)))?;
    if cell.is_null() && !col.nullable {
        return Err(AppError::Validation(format!("{} must not be null", col.name)));
    }
    Ok(cell)
}
