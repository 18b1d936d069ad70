use super::decode_all;
use crate::error::StoreResult;
use crate::models::GroupMembership;
use crate::store::{from_row, to_row, Filter, RowStore, Table, TableNames};
use std::sync::Arc;
use uuid::Uuid;

/// Repository for group membership data access
pub struct GroupMembershipRepository {
    store: Arc<dyn RowStore>,
    table: String,
}

impl GroupMembershipRepository {
    pub fn new(store: Arc<dyn RowStore>, names: &TableNames) -> Self {
        Self {
            store,
            table: names.get(Table::GroupMemberships),
        }
    }

    /// Add a member to a group; a second insert for the same pair is a duplicate
    pub async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<GroupMembership> {
        let membership = GroupMembership::new(group_id, user_id);
        let row = self.store.insert(&self.table, to_row(&membership)?).await?;
        from_row(row)
    }

    /// Remove a member from a group
    pub async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        self.store
            .delete(
                &self.table,
                &[Filter::eq("group_id", group_id), Filter::eq("user_id", user_id)],
            )
            .await
    }

    /// Drop every membership of a group
    pub async fn remove_all(&self, group_id: Uuid) -> StoreResult<bool> {
        self.store
            .delete(&self.table, &[Filter::eq("group_id", group_id)])
            .await
    }

    pub async fn is_member(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let rows = self
            .store
            .select(
                &self.table,
                &[Filter::eq("group_id", group_id), Filter::eq("user_id", user_id)],
                Some(1),
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// Find all members of a group, in join order
    pub async fn find_by_group(&self, group_id: Uuid) -> StoreResult<Vec<GroupMembership>> {
        let rows = self
            .store
            .select(&self.table, &[Filter::eq("group_id", group_id)], None)
            .await?;
        let mut members: Vec<GroupMembership> = decode_all(rows)?;
        members.sort_by_key(|m| m.joined_at);
        Ok(members)
    }

    /// Find all memberships of a user
    pub async fn find_by_user(&self, user_id: Uuid) -> StoreResult<Vec<GroupMembership>> {
        let rows = self
            .store
            .select(&self.table, &[Filter::eq("user_id", user_id)], None)
            .await?;
        let mut memberships: Vec<GroupMembership> = decode_all(rows)?;
        memberships.sort_by_key(|m| m.joined_at);
        Ok(memberships)
    }
}
