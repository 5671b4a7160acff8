//! Row stores: where statements for a resource are executed.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::config::ResolvedResource;
use crate::error::AppError;
use crate::sql::CellValue;
use async_trait::async_trait;
use serde_json::Value;

/// One method per CRUD statement. Rows come back as flat JSON objects keyed by column name.
/// `None` means no row matched the id.
#[async_trait]
pub trait RowStore: Send + Sync {
    async fn list(&self, resource: &ResolvedResource) -> Result<Vec<Value>, AppError>;

    async fn get(&self, resource: &ResolvedResource, id: &CellValue) -> Result<Option<Value>, AppError>;

    /// Inserts the given columns in order; omitted columns take their defaults.
    async fn insert(
        &self,
        resource: &ResolvedResource,
        values: &[(String, CellValue)],
    ) -> Result<Value, AppError>;

    async fn update(
        &self,
        resource: &ResolvedResource,
        id: &CellValue,
        changes: &[(String, CellValue)],
    ) -> Result<Option<Value>, AppError>;

    async fn delete(&self, resource: &ResolvedResource, id: &CellValue) -> Result<Option<Value>, AppError>;

    /// Readiness probe.
    async fn ping(&self) -> Result<(), AppError>;
}
