//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from a resolved resource.

use crate::config::ResolvedResource;
use crate::sql::CellValue;

/// Quote identifier for PostgreSQL (safe: only from the catalog).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(resource: &ResolvedResource) -> String {
    format!(
        "{}.{}",
        quoted(&resource.schema_name),
        quoted(&resource.table_name)
    )
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<CellValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: CellValue) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

fn column_list(resource: &ResolvedResource) -> String {
    resource
        .columns
        .iter()
        .map(|c| quoted(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT every row ordered by primary key.
pub fn select_list(resource: &ResolvedResource) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        column_list(resource),
        qualified_table(resource),
        quoted(&resource.pk_column)
    );
    q
}

/// SELECT by primary key; the id is the sole param.
pub fn select_by_id(resource: &ResolvedResource, id: &CellValue) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(id.clone());
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}",
        column_list(resource),
        qualified_table(resource),
        quoted(&resource.pk_column),
        n
    );
    q
}

/// INSERT with values bound positionally in the order given.
/// Callers pass only the columns to write; the rest take their defaults.
pub fn insert(resource: &ResolvedResource, values: &[(String, CellValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(resource);
    let returning = column_list(resource);
    if values.is_empty() {
        q.sql = format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, returning);
        return q;
    }
    let mut cols = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    for (name, v) in values {
        let n = q.push_param(v.clone());
        cols.push(quoted(name));
        placeholders.push(format!("${}", n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table,
        cols.join(", "),
        placeholders.join(", "),
        returning
    );
    q
}

/// UPDATE by id: one `"column" = $n` per change, id bound last.
/// With no changes this degrades to a SELECT by id so the caller still gets the row.
pub fn update(resource: &ResolvedResource, id: &CellValue, changes: &[(String, CellValue)]) -> QueryBuf {
    if changes.is_empty() {
        return select_by_id(resource, id);
    }
    let mut q = QueryBuf::new();
    let sets: Vec<String> = changes
        .iter()
        .map(|(name, v)| format!("{} = ${}", quoted(name), q.push_param(v.clone())))
        .collect();
    let id_param = q.push_param(id.clone());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        qualified_table(resource),
        sets.join(", "),
        quoted(&resource.pk_column),
        id_param,
        column_list(resource)
    );
    q
}

/// DELETE by id, returning the removed row.
pub fn delete(resource: &ResolvedResource, id: &CellValue) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(id.clone());
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${} RETURNING {}",
        qualified_table(resource),
        quoted(&resource.pk_column),
        n,
        column_list(resource)
    );
    q
}
