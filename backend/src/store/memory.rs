use super::{value_text, Filter, Row, RowStore, Table, TableNames};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory row store for tests and local development.
///
/// Rows are kept in insertion order per table. Unique keys registered with
/// [`MemoryStore::with_unique`] are enforced on insert and update the way the
/// database constraints would be.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    unique_keys: HashMap<String, Vec<Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store carrying the unique keys of the service schema
    pub fn with_schema(names: &TableNames) -> Self {
        let mut store = Self::new();
        for table in Table::ALL {
            for key in table.unique_keys() {
                store = store.with_unique(&names.get(table), key);
            }
        }
        store
    }

    pub fn with_unique(mut self, table: &str, columns: &[&str]) -> Self {
        self.unique_keys
            .entry(table.to_string())
            .or_default()
            .push(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Number of rows currently held in `table`
    pub async fn len(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map_or(0, Vec::len)
    }

    fn clashes(&self, table: &str, rows: &[Row], candidate: &Row, skip: Option<usize>) -> Option<String> {
        let keys = self.unique_keys.get(table)?;
        keys.iter().find_map(|key| {
            let wanted: Vec<Option<String>> =
                key.iter().map(|c| candidate.get(c).and_then(value_text)).collect();
            // NULLs never collide, as in Postgres
            if wanted.iter().any(Option::is_none) {
                return None;
            }
            rows.iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != skip)
                .any(|(_, row)| {
                    key.iter()
                        .zip(&wanted)
                        .all(|(c, w)| row.get(c).and_then(value_text) == *w)
                })
                .then(|| format!("{} ({}) already exists", table, key.join(", ")))
        })
    }
}

fn matches(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| match filter {
        Filter::Eq(column, value) => match (row.get(column).and_then(value_text), value_text(value)) {
            (Some(have), Some(want)) => have == want,
            (None, None) => true,
            _ => false,
        },
        Filter::IsNull(column) => row.get(column).map_or(true, Value::is_null),
        Filter::NotNull(column) => row.get(column).is_some_and(|v| !v.is_null()),
    })
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        limit: Option<usize>,
    ) -> StoreResult<Vec<Row>> {
        let tables = self.tables.read().await;
        let rows = tables.get(table).map(Vec::as_slice).unwrap_or(&[]);
        Ok(rows
            .iter()
            .filter(|row| matches(row, filters))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row> {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        if let Some(msg) = self.clashes(table, rows, &row, None) {
            return Err(StoreError::Duplicate(msg));
        }
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        data: Row,
    ) -> StoreResult<Option<Row>> {
        if filters.is_empty() {
            return Err(StoreError::InvalidInput("update requires a filter".into()));
        }
        if data.is_empty() {
            return Err(StoreError::InvalidInput("update requires at least one column".into()));
        }

        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(None);
        };

        let targets: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| matches(row, filters))
            .map(|(i, _)| i)
            .collect();

        // Validate every target first so a clash leaves the table untouched
        let mut updated = Vec::with_capacity(targets.len());
        for &i in &targets {
            let mut next = rows[i].clone();
            for (column, value) in &data {
                next.insert(column.clone(), value.clone());
            }
            if let Some(msg) = self.clashes(table, rows, &next, Some(i)) {
                return Err(StoreError::Duplicate(msg));
            }
            updated.push((i, next));
        }

        let first = updated.first().map(|(_, row)| row.clone());
        for (i, row) in updated {
            rows[i] = row;
        }
        Ok(first)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> StoreResult<bool> {
        if filters.is_empty() {
            return Err(StoreError::InvalidInput("delete requires a filter".into()));
        }
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|row| !matches(row, filters));
        Ok(rows.len() < before)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
