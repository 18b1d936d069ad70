use super::{columns, decode_all, decode_first, value};
use crate::error::StoreResult;
use crate::models::Split;
use crate::store::{from_row, to_row, Filter, Row, RowStore, Table, TableNames};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Repository for split data access
pub struct SplitRepository {
    store: Arc<dyn RowStore>,
    table: String,
}

impl SplitRepository {
    pub fn new(store: Arc<dyn RowStore>, names: &TableNames) -> Self {
        Self {
            store,
            table: names.get(Table::Splits),
        }
    }

    pub async fn create(&self, split: &Split) -> StoreResult<Split> {
        let row = self.store.insert(&self.table, to_row(split)?).await?;
        from_row(row)
    }

    pub async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Split>> {
        let rows = self
            .store
            .select(&self.table, &[Filter::eq("id", id)], Some(1))
            .await?;
        decode_first(rows)
    }

    pub async fn list_for_expense(&self, expense_id: Uuid) -> StoreResult<Vec<Split>> {
        self.list(&[Filter::eq("expense_id", expense_id)]).await
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Split>> {
        self.list(&[Filter::eq("user_id", user_id)]).await
    }

    /// Splits of an expense with a payment request awaiting confirmation
    pub async fn list_pending_for_expense(&self, expense_id: Uuid) -> StoreResult<Vec<Split>> {
        self.list(&[
            Filter::eq("expense_id", expense_id),
            Filter::not_null("paid_request"),
            Filter::is_null("paid_confirmed"),
        ])
        .await
    }

    /// A user's split rows exactly as stored, for tolerant history reads
    pub async fn raw_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Row>> {
        self.store
            .select(&self.table, &[Filter::eq("user_id", user_id)], None)
            .await
    }

    async fn list(&self, filters: &[Filter]) -> StoreResult<Vec<Split>> {
        let rows = self.store.select(&self.table, filters, None).await?;
        let mut splits: Vec<Split> = decode_all(rows)?;
        splits.sort_by_key(|s| s.created_at);
        Ok(splits)
    }

    /// Set or clear the debtor's payment request
    pub async fn set_paid_request(
        &self,
        id: Uuid,
        at: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<Split>> {
        self.set(id, columns([("paid_request", value(at)?)])).await
    }

    pub async fn set_paid_confirmed(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Split>> {
        self.set(id, columns([("paid_confirmed", value(at)?)])).await
    }

    async fn set(&self, id: Uuid, data: Row) -> StoreResult<Option<Split>> {
        let row = self
            .store
            .update(&self.table, &[Filter::eq("id", id)], data)
            .await?;
        row.map(from_row).transpose()
    }

    pub async fn delete_for_expense(&self, expense_id: Uuid) -> StoreResult<bool> {
        self.store
            .delete(&self.table, &[Filter::eq("expense_id", expense_id)])
            .await
    }
}
