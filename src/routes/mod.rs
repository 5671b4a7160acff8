//! Routers and the middleware stack shared by the binary and tests.

mod common;
mod resource;

pub use common::common_routes;
pub use resource::resource_routes;

use crate::config::Settings;
use crate::error::AppError;
use crate::state::AppState;
use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::{BoxError, Router};
use tower::timeout::{error::Elapsed, TimeoutLayer};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Full application with default settings (no timeout, 1 MiB body limit).
pub fn app(state: AppState) -> Router {
    app_with_settings(state, &Settings::default())
}

pub fn app_with_settings(state: AppState, settings: &Settings) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api", resource_routes(state))
        .fallback(fallback);

    if let Some(timeout) = settings.request_timeout {
        router = router.layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(timeout)),
        );
    }
    // Oversized bodies surface as a JSON extractor rejection, mapped in the handlers.
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(DefaultBodyLimit::max(settings.body_limit)),
    )
}

async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        AppError::Timeout
    } else {
        AppError::Internal(err.to_string())
    }
}

async fn fallback(uri: axum::http::Uri) -> AppError {
    AppError::not_found(uri.path().trim_start_matches('/'))
}
