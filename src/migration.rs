//! Table bootstrap: CREATE SCHEMA / CREATE TABLE IF NOT EXISTS for every catalog resource.
//! Existing tables are left as they are.

use crate::config::{ResolvedCatalog, ResolvedResource};
use crate::error::AppError;
use crate::sql::{qualified_table, quoted};
use sqlx::PgPool;
use std::collections::BTreeSet;

pub async fn ensure_tables(pool: &PgPool, catalog: &ResolvedCatalog) -> Result<(), AppError> {
    let schemas: BTreeSet<&str> = catalog
        .resources
        .iter()
        .map(|r| r.schema_name.as_str())
        .collect();
    for schema in schemas {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(schema)))
            .execute(pool)
            .await?;
    }
    for r in &catalog.resources {
        let ddl = create_table_sql(r);
        tracing::debug!(resource = %r.name, sql = %ddl, "bootstrap");
        sqlx::query(&ddl).execute(pool).await?;
    }
    tracing::info!(resources = catalog.resources.len(), "tables ensured");
    Ok(())
}

pub fn create_table_sql(resource: &ResolvedResource) -> String {
    let col_defs: Vec<String> = resource
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let mut def = format!("{} {}", quoted(&c.name), c.type_.sql_name());
            if i == resource.pk_index {
                def.push_str(" PRIMARY KEY");
            } else if !c.nullable {
                def.push_str(" NOT NULL");
            }
            if let Some(sql) = c.default.as_ref().and_then(|d| d.sql.as_deref()) {
                def.push_str(" DEFAULT ");
                def.push_str(sql);
            }
            def
        })
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        qualified_table(resource),
        col_defs.join(", ")
    )
}
