use super::{check_identifier, value_text, Filter, Row, RowStore};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Postgres-backed row store.
///
/// Rows leave the database as `to_jsonb(t)` and enter it through
/// `jsonb_populate_record`, so column types are coerced by Postgres itself.
/// Equality filters compare the column's text form with the bound value.
#[derive(Clone)]
pub struct PgRowStore {
    pool: PgPool,
}

impl PgRowStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn quoted(name: &str) -> StoreResult<String> {
    Ok(format!("\"{}\"", check_identifier(name)?))
}

fn push_where(builder: &mut QueryBuilder<'_, Postgres>, filters: &[Filter]) -> StoreResult<()> {
    if filters.is_empty() {
        return Ok(());
    }
    builder.push(" WHERE ");
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            builder.push(" AND ");
        }
        let column = quoted(filter.column())?;
        match filter {
            Filter::Eq(_, value) => match value_text(value) {
                Some(text) => {
                    builder.push(format!("t.{}::text = ", column));
                    builder.push_bind(text);
                }
                None => {
                    builder.push(format!("t.{} IS NULL", column));
                }
            },
            Filter::IsNull(_) => {
                builder.push(format!("t.{} IS NULL", column));
            }
            Filter::NotNull(_) => {
                builder.push(format!("t.{} IS NOT NULL", column));
            }
        }
    }
    Ok(())
}

fn into_row(value: Value) -> StoreResult<Row> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidInput(format!(
            "expected a row object, got {}",
            other
        ))),
    }
}

#[async_trait]
impl RowStore for PgRowStore {
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        limit: Option<usize>,
    ) -> StoreResult<Vec<Row>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT to_jsonb(t) FROM {} AS t",
            quoted(table)?
        ));
        push_where(&mut builder, filters)?;
        if let Some(limit) = limit {
            builder.push(" LIMIT ");
            builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let values: Vec<Value> = builder
            .build_query_scalar::<Value>()
            .fetch_all(&self.pool)
            .await?;
        values.into_iter().map(into_row).collect()
    }

    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row> {
        let table = quoted(table)?;
        for column in row.keys() {
            check_identifier(column)?;
        }

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {table} AS t SELECT * FROM jsonb_populate_record(NULL::{table}, "
        ));
        builder.push_bind(Json(Value::Object(row)));
        builder.push(") RETURNING to_jsonb(t)");

        let value: Value = builder
            .build_query_scalar::<Value>()
            .fetch_one(&self.pool)
            .await?;
        into_row(value)
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

        let table = quoted(table)?;
        let assignments = data
            .keys()
            .map(|column| quoted(column).map(|c| format!("{c} = r.{c}")))
            .collect::<StoreResult<Vec<_>>>()?
            .join(", ");

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "UPDATE {table} AS t SET {assignments} FROM jsonb_populate_record(NULL::{table}, "
        ));
        builder.push_bind(Json(Value::Object(data)));
        builder.push(") AS r");
        push_where(&mut builder, filters)?;
        builder.push(" RETURNING to_jsonb(t)");

        let values: Vec<Value> = builder
            .build_query_scalar::<Value>()
            .fetch_all(&self.pool)
            .await?;
        values.into_iter().next().map(into_row).transpose()
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> StoreResult<bool> {
        if filters.is_empty() {
            return Err(StoreError::InvalidInput("delete requires a filter".into()));
        }

        let mut builder =
            QueryBuilder::<Postgres>::new(format!("DELETE FROM {} AS t", quoted(table)?));
        push_where(&mut builder, filters)?;

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
