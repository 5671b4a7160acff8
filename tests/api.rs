//! End-to-end routing tests over the in-memory store.

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use taskflow_api::{
    app, app_with_settings, builtin_catalog, resolve, sql::CellValue, AppError, AppState,
    MemoryStore, ResolvedResource, RowStore, Settings,
};
use tower::ServiceExt; // for `oneshot`

fn test_app_with(store: Arc<dyn RowStore>, settings: &Settings) -> Router {
    let catalog = resolve(&builtin_catalog().unwrap()).unwrap();
    app_with_settings(AppState::new(store, catalog), settings)
}

fn test_app(store: Arc<dyn RowStore>) -> Router {
    let catalog = resolve(&builtin_catalog().unwrap()).unwrap();
    app(AppState::new(store, catalog))
}

fn memory_app() -> Router {
    test_app(Arc::new(MemoryStore::new()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_returns_ok() {
    let app = memory_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn ready_reports_database_ok() {
    let app = memory_app();
    let (status, body) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn version_reports_package() {
    let app = memory_app();
    let (status, body) = send(&app, "GET", "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "taskflow-api");
}

#[tokio::test]
async fn category_lifecycle() {
    let app = memory_app();

    let (status, created) = send(
        &app,
        "POST",
        "/api/categories",
        Some(json!({ "name": "Work", "color": "#ff0000" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Work");
    assert_eq!(created["color"], "#ff0000");
    let id = created["id"].as_i64().unwrap();
    assert!(created["created_at"].is_string());

    let (status, fetched) = send(&app, "GET", &format!("/api/categories/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, body) = send(&app, "DELETE", &format!("/api/categories/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "categories deleted successfully" }));

    let (status, body) = send(&app, "GET", &format!("/api/categories/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "categories not found" }));
}

#[tokio::test]
async fn task_lifecycle() {
    let app = memory_app();

    let (status, created) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({ "title": "X", "priority": "low" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "X");
    assert_eq!(created["priority"], "low");
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, "GET", &format!("/api/tasks/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, body) = send(&app, "DELETE", &format!("/api/tasks/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "tasks deleted successfully" }));

    let (status, body) = send(&app, "GET", &format!("/api/tasks/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "tasks not found" }));
}

#[tokio::test]
async fn update_with_unknown_column_is_400_and_leaves_row_alone() {
    let app = memory_app();
    let (_, created) = send(&app, "POST", "/api/tasks", Some(json!({ "title": "keep" }))).await;
    let uri = format!("/api/tasks/{}", created["id"]);

    let (status, body) = send(&app, "PUT", &uri, Some(json!({ "bogus": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown column 'bogus' for tasks");

    let (_, fetched) = send(&app, "GET", &uri, None).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn task_create_applies_defaults_and_lists_in_id_order() {
    let app = memory_app();
    for title in ["first", "second"] {
        let (status, _) = send(&app, "POST", "/api/tasks", Some(json!({ "title": title }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, rows) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["title"], "first");
    assert_eq!(rows[1]["title"], "second");
    assert_eq!(rows[0]["completed"], false);
    assert_eq!(rows[0]["priority"], "medium");
    assert_eq!(rows[0]["description"], Value::Null);
    assert!(rows[0]["id"].as_i64().unwrap() < rows[1]["id"].as_i64().unwrap());
}

#[tokio::test]
async fn task_update_accepts_camel_case_keys() {
    let app = memory_app();
    let (_, created) = send(&app, "POST", "/api/tasks", Some(json!({ "title": "write" }))).await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{}", id),
        Some(json!({ "completed": true, "dueDate": "2026-11-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["due_date"], "2026-11-01");
    assert_eq!(updated["title"], "write");

    let (status, patched) = send(
        &app,
        "PATCH",
        &format!("/api/tasks/{}", id),
        Some(json!({ "priority": "high" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["priority"], "high");
    assert_eq!(patched["completed"], true);
}

#[tokio::test]
async fn update_missing_row_is_404() {
    let app = memory_app();
    let (status, body) = send(
        &app,
        "PUT",
        "/api/categories/999999",
        Some(json!({ "name": "Nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "categories not found" }));
}

#[tokio::test]
async fn non_numeric_id_is_404() {
    let app = memory_app();
    let (status, body) = send(&app, "GET", "/api/tasks/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "tasks not found");
}

#[tokio::test]
async fn unknown_resource_is_404() {
    let app = memory_app();
    let (status, body) = send(&app, "GET", "/api/projects", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "projects not found");
}

#[tokio::test]
async fn unknown_column_is_400() {
    let app = memory_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/categories",
        Some(json!({ "name": "Home", "owner": "me" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("owner"));
}

#[tokio::test]
async fn validation_failures_are_422() {
    let app = memory_app();
    let (status, body) = send(&app, "POST", "/api/tasks", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "title is required");

    let (status, _) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({ "title": "x", "priority": "urgent" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({ "title": "x", "completed": "yes" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn malformed_json_is_400_with_error_body() {
    let app = memory_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/tasks")
        .header("content-type", "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn oversized_body_is_413_with_error_body() {
    let settings = Settings {
        body_limit: 64,
        ..Settings::default()
    };
    let app = test_app_with(Arc::new(MemoryStore::new()), &settings);
    let payload = json!({ "title": "x".repeat(200) }).to_string();

    for with_length in [true, false] {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/tasks")
            .header("content-type", "application/json");
        if with_length {
            builder = builder.header("content-length", payload.len());
        }
        let request = builder.body(Body::from(payload.clone())).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, json!({ "error": "request body too large" }));
    }

    let (status, _) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = memory_app();
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

/// Store whose every statement fails, as if the pool were exhausted.
struct FailingStore;

fn pool_timeout(resource: &ResolvedResource, operation: &'static str) -> AppError {
    AppError::store(&resource.name, operation, sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl RowStore for FailingStore {
    async fn list(&self, resource: &ResolvedResource) -> Result<Vec<Value>, AppError> {
        Err(pool_timeout(resource, "list"))
    }

    async fn get(&self, resource: &ResolvedResource, _: &CellValue) -> Result<Option<Value>, AppError> {
        Err(pool_timeout(resource, "get"))
    }

    async fn insert(
        &self,
        resource: &ResolvedResource,
        _: &[(String, CellValue)],
    ) -> Result<Value, AppError> {
        Err(pool_timeout(resource, "insert"))
    }

    async fn update(
        &self,
        resource: &ResolvedResource,
        _: &CellValue,
        _: &[(String, CellValue)],
    ) -> Result<Option<Value>, AppError> {
        Err(pool_timeout(resource, "update"))
    }

    async fn delete(&self, resource: &ResolvedResource, _: &CellValue) -> Result<Option<Value>, AppError> {
        Err(pool_timeout(resource, "delete"))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }
}

#[tokio::test]
async fn store_failures_hide_details() {
    let app = test_app(Arc::new(FailingStore));
    let (status, body) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));

    let (status, body) = send(&app, "POST", "/api/tasks", Some(json!({ "title": "x" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn ready_degrades_when_store_is_down() {
    let app = test_app(Arc::new(FailingStore));
    let (status, body) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "status": "degraded", "database": "unavailable" }));

    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

/// Delegates to a `MemoryStore` but stalls on list.
struct SlowStore {
    inner: MemoryStore,
    delay: Duration,
}

#[async_trait]
impl RowStore for SlowStore {
    async fn list(&self, resource: &ResolvedResource) -> Result<Vec<Value>, AppError> {
        tokio::time::sleep(self.delay).await;
        self.inner.list(resource).await
    }

    async fn get(&self, resource: &ResolvedResource, id: &CellValue) -> Result<Option<Value>, AppError> {
        self.inner.get(resource, id).await
    }

    async fn insert(
        &self,
        resource: &ResolvedResource,
        values: &[(String, CellValue)],
    ) -> Result<Value, AppError> {
        self.inner.insert(resource, values).await
    }

    async fn update(
        &self,
        resource: &ResolvedResource,
        id: &CellValue,
        changes: &[(String, CellValue)],
    ) -> Result<Option<Value>, AppError> {
        self.inner.update(resource, id, changes).await
    }

    async fn delete(&self, resource: &ResolvedResource, id: &CellValue) -> Result<Option<Value>, AppError> {
        self.inner.delete(resource, id).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.inner.ping().await
    }
}

#[tokio::test]
async fn request_timeout_is_408_with_error_body() {
    let settings = Settings {
        request_timeout: Some(Duration::from_millis(50)),
        ..Settings::default()
    };
    let store = SlowStore {
        inner: MemoryStore::new(),
        delay: Duration::from_secs(2),
    };
    let app = test_app_with(Arc::new(store), &settings);

    let (status, body) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body, json!({ "error": "request timed out" }));

    let (status, _) = send(&app, "POST", "/api/tasks", Some(json!({ "title": "fast" }))).await;
    assert_eq!(status, StatusCode::CREATED);
}
