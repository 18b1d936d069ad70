use super::{columns, decode_all};
use crate::error::StoreResult;
use crate::models::Notification;
use crate::store::{from_row, to_row, Filter, RowStore, Table, TableNames};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Repository for notification data access
pub struct NotificationRepository {
    store: Arc<dyn RowStore>,
    table: String,
}

impl NotificationRepository {
    pub fn new(store: Arc<dyn RowStore>, names: &TableNames) -> Self {
        Self {
            store,
            table: names.get(Table::Notifications),
        }
    }

    pub async fn create(&self, notification: &Notification) -> StoreResult<Notification> {
        let row = self.store.insert(&self.table, to_row(notification)?).await?;
        from_row(row)
    }

    /// Unprocessed notifications of a user, oldest first
    pub async fn list_unprocessed(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        let rows = self
            .store
            .select(
                &self.table,
                &[Filter::eq("user_id", user_id), Filter::eq("processed", false)],
                None,
            )
            .await?;
        let mut notifications: Vec<Notification> = decode_all(rows)?;
        notifications.sort_by_key(|n| n.created_at);
        Ok(notifications)
    }

    pub async fn mark_processed(&self, id: Uuid) -> StoreResult<Option<Notification>> {
        let row = self
            .store
            .update(
                &self.table,
                &[Filter::eq("id", id)],
                columns([("processed", Value::Bool(true))]),
            )
            .await?;
        row.map(from_row).transpose()
    }
}
