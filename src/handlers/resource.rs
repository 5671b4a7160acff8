//! Resource CRUD handlers: list, read, create, update, delete.

use crate::config::ResolvedResource;
use crate::error::AppError;
use crate::response;
use crate::service::CrudService;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

fn resource<'a>(state: &'a AppState, name: &str) -> Result<&'a ResolvedResource, AppError> {
    state
        .catalog
        .resource(name)
        .ok_or_else(|| AppError::not_found(name))
}

/// Keeps malformed bodies on the `{ "error": ... }` shape instead of axum's plain-text rejection.
fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload.map(|Json(v)| v).map_err(|e| match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge,
        _ => AppError::BadRequest(e.body_text()),
    })
}

pub async fn list(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resource(&state, &name)?;
    let rows = CrudService::list(state.store.as_ref(), resource).await?;
    Ok(response::ok_many(rows))
}

pub async fn read(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resource(&state, &name)?;
    let row = CrudService::read(state.store.as_ref(), resource, &id).await?;
    Ok(response::ok(row))
}

pub async fn create(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resource(&state, &name)?;
    let body = json_body(payload)?;
    let row = CrudService::create(state.store.as_ref(), resource, body).await?;
    tracing::info!(resource = %resource.name, id = %row[&resource.pk_column], "created");
    Ok(response::created(row))
}

pub async fn update(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resource(&state, &name)?;
    let body = json_body(payload)?;
    let row = CrudService::update(state.store.as_ref(), resource, &id, body).await?;
    Ok(response::ok(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resource(&state, &name)?;
    CrudService::delete(state.store.as_ref(), resource, &id).await?;
    tracing::info!(resource = %resource.name, %id, "deleted");
    Ok(response::deleted(&resource.name))
}
