//! TaskFlow API: descriptor-driven CRUD over PostgreSQL tables.

pub mod case;
pub mod config;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{builtin_catalog, load_catalog, resolve, ResolvedCatalog, ResolvedResource, Settings};
pub use error::{AppError, ConfigError};
pub use migration::ensure_tables;
pub use routes::{app, app_with_settings, common_routes, resource_routes};
pub use service::CrudService;
pub use state::AppState;
pub use store::{MemoryStore, PgStore, RowStore};
