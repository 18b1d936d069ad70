use super::{columns, decode_all, decode_first, value};
use crate::error::StoreResult;
use crate::models::Group;
use crate::store::{from_row, to_row, Filter, Row, RowStore, Table, TableNames};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Repository for group data access
pub struct GroupRepository {
    store: Arc<dyn RowStore>,
    table: String,
}

impl GroupRepository {
    pub fn new(store: Arc<dyn RowStore>, names: &TableNames) -> Self {
        Self {
            store,
            table: names.get(Table::Groups),
        }
    }

    pub async fn create(&self, group: &Group) -> StoreResult<Group> {
        let row = self.store.insert(&self.table, to_row(group)?).await?;
        from_row(row)
    }

    pub async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Group>> {
        let rows = self
            .store
            .select(&self.table, &[Filter::eq("id", id)], Some(1))
            .await?;
        decode_first(rows)
    }

    /// Groups created by a user, oldest first
    pub async fn list_created_by(&self, user_id: Uuid) -> StoreResult<Vec<Group>> {
        let rows = self
            .store
            .select(&self.table, &[Filter::eq("created_by", user_id)], None)
            .await?;
        let mut groups: Vec<Group> = decode_all(rows)?;
        groups.sort_by_key(|g| g.created_at);
        Ok(groups)
    }

    /// Apply a partial update built by the caller
    pub async fn update(&self, id: Uuid, data: Row) -> StoreResult<Option<Group>> {
        let row = self
            .store
            .update(&self.table, &[Filter::eq("id", id)], data)
            .await?;
        row.map(from_row).transpose()
    }

    pub async fn set_budget(&self, id: Uuid, budget: Decimal) -> StoreResult<Option<Group>> {
        self.update(id, columns([("total_budget", value(budget)?)]))
            .await
    }

    pub async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        self.store.delete(&self.table, &[Filter::eq("id", id)]).await
    }
}
