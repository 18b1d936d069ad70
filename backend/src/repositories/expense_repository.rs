use super::{decode_all, decode_first};
use crate::error::StoreResult;
use crate::models::Expense;
use crate::store::{from_row, to_row, Filter, Row, RowStore, Table, TableNames};
use std::sync::Arc;
use uuid::Uuid;

/// Repository for expense data access
pub struct ExpenseRepository {
    store: Arc<dyn RowStore>,
    table: String,
}

impl ExpenseRepository {
    pub fn new(store: Arc<dyn RowStore>, names: &TableNames) -> Self {
        Self {
            store,
            table: names.get(Table::Expenses),
        }
    }

    pub async fn create(&self, expense: &Expense) -> StoreResult<Expense> {
        let row = self.store.insert(&self.table, to_row(expense)?).await?;
        from_row(row)
    }

    pub async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Expense>> {
        let rows = self
            .store
            .select(&self.table, &[Filter::eq("id", id)], Some(1))
            .await?;
        decode_first(rows)
    }

    /// The expense row exactly as stored, without decoding
    pub async fn raw_by_id(&self, id: &str) -> StoreResult<Option<Row>> {
        let rows = self
            .store
            .select(&self.table, &[Filter::eq("id", id)], Some(1))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Expenses created by a user, oldest first
    pub async fn list_created_by(&self, user_id: Uuid) -> StoreResult<Vec<Expense>> {
        self.list(&[Filter::eq("created_by", user_id)]).await
    }

    pub async fn list_for_group(&self, group_id: Uuid) -> StoreResult<Vec<Expense>> {
        self.list(&[Filter::eq("group_id", group_id)]).await
    }

    pub async fn list_created_by_in_group(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> StoreResult<Vec<Expense>> {
        self.list(&[
            Filter::eq("created_by", user_id),
            Filter::eq("group_id", group_id),
        ])
        .await
    }

    async fn list(&self, filters: &[Filter]) -> StoreResult<Vec<Expense>> {
        let rows = self.store.select(&self.table, filters, None).await?;
        let mut expenses: Vec<Expense> = decode_all(rows)?;
        expenses.sort_by_key(|e| e.created_at);
        Ok(expenses)
    }

    /// Apply a partial update built by the caller
    pub async fn update(&self, id: Uuid, data: Row) -> StoreResult<Option<Expense>> {
        let row = self
            .store
            .update(&self.table, &[Filter::eq("id", id)], data)
            .await?;
        row.map(from_row).transpose()
    }

    pub async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        self.store.delete(&self.table, &[Filter::eq("id", id)]).await
    }
}
