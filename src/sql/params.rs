//! Typed values bound to statements, converted from request JSON per column type.

use crate::config::ColumnType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

/// A column value ready to bind. Nulls keep their column type so the parameter is typed.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Null(ColumnType),
    Bool(bool),
    BigInt(i64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Uuid(uuid::Uuid),
}

impl CellValue {
    /// Converts a request value for a column of `type_`. Returns a message on mismatch.
    pub fn from_json(type_: ColumnType, v: &Value) -> Result<Self, String> {
        if v.is_null() {
            return Ok(CellValue::Null(type_));
        }
        match type_ {
            ColumnType::Boolean => v.as_bool().map(CellValue::Bool).ok_or_else(|| "must be a boolean".to_string()),
            ColumnType::BigSerial | ColumnType::BigInt => {
                v.as_i64().map(CellValue::BigInt).ok_or_else(|| "must be an integer".to_string())
            }
            ColumnType::Text => v
                .as_str()
                .map(|s| CellValue::Text(s.to_string()))
                .ok_or_else(|| "must be a string".to_string()),
            ColumnType::Date => v
                .as_str()
                .and_then(parse_date)
                .map(CellValue::Date)
                .ok_or_else(|| "must be a date (YYYY-MM-DD)".to_string()),
            ColumnType::Timestamptz => v
                .as_str()
                .and_then(parse_timestamp)
                .map(CellValue::Timestamp)
                .ok_or_else(|| "must be an RFC 3339 timestamp".to_string()),
            ColumnType::Uuid => v
                .as_str()
                .and_then(|s| uuid::Uuid::parse_str(s).ok())
                .map(CellValue::Uuid)
                .ok_or_else(|| "must be a UUID".to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null(_))
    }

    /// JSON form used in responses; matches what rows decoded from PostgreSQL look like.
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Null(_) => Value::Null,
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::BigInt(n) => Value::Number((*n).into()),
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Date(d) => Value::String(format_date(d)),
            CellValue::Timestamp(t) => Value::String(format_timestamp(t)),
            CellValue::Uuid(u) => Value::String(u.to_string()),
        }
    }

    /// Binds the value with its concrete PostgreSQL type.
    pub fn bind_to<'q>(
        &self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self.clone() {
            CellValue::Null(t) => match t {
                ColumnType::Boolean => query.bind(None::<bool>),
                ColumnType::BigSerial | ColumnType::BigInt => query.bind(None::<i64>),
                ColumnType::Text => query.bind(None::<String>),
                ColumnType::Date => query.bind(None::<NaiveDate>),
                ColumnType::Timestamptz => query.bind(None::<DateTime<Utc>>),
                ColumnType::Uuid => query.bind(None::<uuid::Uuid>),
            },
            CellValue::Bool(b) => query.bind(b),
            CellValue::BigInt(n) => query.bind(n),
            CellValue::Text(s) => query.bind(s),
            CellValue::Date(d) => query.bind(d),
            CellValue::Timestamp(t) => query.bind(t),
            CellValue::Uuid(u) => query.bind(u),
        }
    }
}

pub fn format_date(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(s).map(|t| t.date_naive()))
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(t.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}
