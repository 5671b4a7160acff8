//! Shared application state for all routes. Built once at startup.

use crate::config::ResolvedCatalog;
use crate::store::RowStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RowStore>,
    pub catalog: Arc<ResolvedCatalog>,
}

impl AppState {
    pub fn new(store: Arc<dyn RowStore>, catalog: ResolvedCatalog) -> Self {
        AppState {
            store,
            catalog: Arc::new(catalog),
        }
    }
}
