//! Response bodies and status helpers. Rows are returned bare, without an envelope.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

pub fn created(row: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(row))
}

pub fn ok(row: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(row))
}

pub fn ok_many(rows: Vec<Value>) -> (StatusCode, Json<Vec<Value>>) {
    (StatusCode::OK, Json(rows))
}

/// Body returned after a successful delete, e.g. `{"message": "tasks deleted successfully"}`.
pub fn deleted(resource: &str) -> (StatusCode, Json<MessageBody>) {
    (
        StatusCode::OK,
        Json(MessageBody {
            message: format!("{} deleted successfully", resource),
        }),
    )
}
