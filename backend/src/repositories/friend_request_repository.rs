use super::{columns, decode_all, decode_first};
use crate::error::StoreResult;
use crate::models::FriendRequest;
use crate::store::{from_row, to_row, Filter, RowStore, Table, TableNames};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Repository for friend request data access
pub struct FriendRequestRepository {
    store: Arc<dyn RowStore>,
    table: String,
}

impl FriendRequestRepository {
    pub fn new(store: Arc<dyn RowStore>, names: &TableNames) -> Self {
        Self {
            store,
            table: names.get(Table::FriendRequests),
        }
    }

    pub async fn create(&self, request: &FriendRequest) -> StoreResult<FriendRequest> {
        let row = self.store.insert(&self.table, to_row(request)?).await?;
        from_row(row)
    }

    /// The request from `from_user` to `to_user`, whatever its status
    pub async fn find_between(
        &self,
        from_user: Uuid,
        to_user: Uuid,
    ) -> StoreResult<Option<FriendRequest>> {
        let rows = self
            .store
            .select(
                &self.table,
                &[Filter::eq("from_user", from_user), Filter::eq("to_user", to_user)],
                Some(1),
            )
            .await?;
        decode_first(rows)
    }

    pub async fn find_pending(
        &self,
        from_user: Uuid,
        to_user: Uuid,
    ) -> StoreResult<Option<FriendRequest>> {
        Ok(self
            .find_between(from_user, to_user)
            .await?
            .filter(|r| !r.request_completed))
    }

    /// Requests sent by a user, optionally restricted to one completion state
    pub async fn list_from(
        &self,
        user_id: Uuid,
        completed: Option<bool>,
    ) -> StoreResult<Vec<FriendRequest>> {
        self.list("from_user", user_id, completed).await
    }

    /// Requests received by a user, optionally restricted to one completion state
    pub async fn list_to(
        &self,
        user_id: Uuid,
        completed: Option<bool>,
    ) -> StoreResult<Vec<FriendRequest>> {
        self.list("to_user", user_id, completed).await
    }

    async fn list(
        &self,
        column: &str,
        user_id: Uuid,
        completed: Option<bool>,
    ) -> StoreResult<Vec<FriendRequest>> {
        let mut filters = vec![Filter::eq(column, user_id)];
        if let Some(completed) = completed {
            filters.push(Filter::eq("request_completed", completed));
        }
        let rows = self.store.select(&self.table, &filters, None).await?;
        let mut requests: Vec<FriendRequest> = decode_all(rows)?;
        requests.sort_by_key(|r| r.created_at);
        Ok(requests)
    }

    pub async fn mark_completed(&self, id: Uuid) -> StoreResult<Option<FriendRequest>> {
        let row = self
            .store
            .update(
                &self.table,
                &[Filter::eq("id", id)],
                columns([("request_completed", Value::Bool(true))]),
            )
            .await?;
        row.map(from_row).transpose()
    }

    pub async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        self.store.delete(&self.table, &[Filter::eq("id", id)]).await
    }
}
