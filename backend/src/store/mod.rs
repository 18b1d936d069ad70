//! Row store abstraction.
//!
//! Every repository talks to storage through [`RowStore`]: a table addressed
//! by name with filtered `select`/`insert`/`update`/`delete`. Rows travel as
//! JSON objects and are mapped onto typed records by the repositories.

mod memory;
mod postgres;
mod table;

pub use memory::MemoryStore;
pub use postgres::PgRowStore;
pub use table::{Table, TableNames};

use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// A row as it crosses the store boundary
pub type Row = Map<String, Value>;

/// Column predicate applied to select, update and delete
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    IsNull(String),
    NotNull(String),
}

impl Filter {
    pub fn eq<T: Serialize>(column: &str, value: T) -> Self {
        Filter::Eq(column.to_string(), serde_json::json!(value))
    }

    pub fn is_null(column: &str) -> Self {
        Filter::IsNull(column.to_string())
    }

    pub fn not_null(column: &str) -> Self {
        Filter::NotNull(column.to_string())
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _) | Filter::IsNull(c) | Filter::NotNull(c) => c,
        }
    }
}

/// Storage backend contract
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Rows of `table` matching every filter, at most `limit` of them
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        limit: Option<usize>,
    ) -> StoreResult<Vec<Row>>;

    /// Insert one row and return it as stored
    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row>;

    /// Set `data` columns on matching rows; returns the first updated row
    async fn update(&self, table: &str, filters: &[Filter], data: Row)
        -> StoreResult<Option<Row>>;

    /// Delete matching rows; true when at least one row went away
    async fn delete(&self, table: &str, filters: &[Filter]) -> StoreResult<bool>;

    /// Cheap reachability probe
    async fn ping(&self) -> StoreResult<()>;
}

/// Serialize a record into a row
pub fn to_row<T: Serialize>(record: &T) -> StoreResult<Row> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidInput(format!(
            "record must serialize to an object, got {}",
            other
        ))),
    }
}

/// Deserialize a row into a record
pub fn from_row<T: DeserializeOwned>(row: Row) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

/// Text rendering used for equality matching in both backends
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Identifiers are spliced into SQL, so only `[a-z0-9_]` gets through
pub(crate) fn check_identifier(name: &str) -> StoreResult<&str> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}
