//! Resource CRUD routes. The resource segment is resolved against the catalog in each handler,
//! so one route set serves every resource.

use crate::handlers::resource::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn resource_routes(state: AppState) -> Router {
    Router::new()
        .route("/:resource", get(list).post(create))
        .route(
            "/:resource/:id",
            get(read).put(update).patch(update).delete(delete_handler),
        )
        .with_state(state)
}
