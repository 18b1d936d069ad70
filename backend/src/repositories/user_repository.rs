use super::{columns, decode_all, decode_first, value};
use crate::error::StoreResult;
use crate::models::User;
use crate::store::{from_row, to_row, Filter, RowStore, Table, TableNames};
use std::sync::Arc;
use uuid::Uuid;

/// Repository for user data access
pub struct UserRepository {
    store: Arc<dyn RowStore>,
    table: String,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(store: Arc<dyn RowStore>, names: &TableNames) -> Self {
        Self {
            store,
            table: names.get(Table::Users),
        }
    }

    /// Insert a new user
    pub async fn create(&self, user: &User) -> StoreResult<User> {
        let row = self.store.insert(&self.table, to_row(user)?).await?;
        from_row(row)
    }

    /// Find a user by UUID
    pub async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.find_one(Filter::eq("id", id)).await
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.find_one(Filter::eq("email", email)).await
    }

    /// Find a user by Firebase id
    pub async fn find_by_firebase_id(&self, firebase_id: &str) -> StoreResult<Option<User>> {
        self.find_one(Filter::eq("firebase_id", firebase_id)).await
    }

    async fn find_one(&self, filter: Filter) -> StoreResult<Option<User>> {
        let rows = self.store.select(&self.table, &[filter], Some(1)).await?;
        decode_first(rows)
    }

    /// All users, oldest first
    pub async fn list_all(&self, limit: Option<usize>) -> StoreResult<Vec<User>> {
        let rows = self.store.select(&self.table, &[], None).await?;
        let mut users: Vec<User> = decode_all(rows)?;
        users.sort_by_key(|u| u.date_joined);
        if let Some(limit) = limit {
            users.truncate(limit);
        }
        Ok(users)
    }

    /// Users that currently carry a credit score
    pub async fn list_scored(&self) -> StoreResult<Vec<User>> {
        let rows = self
            .store
            .select(&self.table, &[Filter::not_null("credit_score")], None)
            .await?;
        decode_all(rows)
    }

    pub async fn update_name(&self, firebase_id: &str, name: &str) -> StoreResult<Option<User>> {
        let data = columns([("name", value(name)?)]);
        let row = self
            .store
            .update(&self.table, &[Filter::eq("firebase_id", firebase_id)], data)
            .await?;
        row.map(from_row).transpose()
    }

    /// Single-column write of the credit score; `None` clears it
    pub async fn set_credit_score(&self, id: Uuid, score: Option<i32>) -> StoreResult<Option<User>> {
        let data = columns([("credit_score", value(score)?)]);
        let row = self
            .store
            .update(&self.table, &[Filter::eq("id", id)], data)
            .await?;
        row.map(from_row).transpose()
    }
}
