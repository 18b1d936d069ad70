#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use evenly_backend::config::StoreConfig;
use evenly_backend::models::*;
use evenly_backend::repositories::*;
use evenly_backend::services::expense_service::{NewExpense, SplitInput};
use async_trait::async_trait;
use evenly_backend::error::{StoreError, StoreResult};
use evenly_backend::store::{Filter, MemoryStore, Row, RowStore, TableNames};
use evenly_backend::AppState;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Application wired over a fresh in-memory store, with direct repository
/// access for arranging fixtures the API cannot produce (back-dated payments)
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub names: TableNames,
    pub user_repo: Arc<UserRepository>,
    pub expense_repo: Arc<ExpenseRepository>,
    pub split_repo: Arc<SplitRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::for_environment("test"))
    }

    pub fn with_config(config: StoreConfig) -> Self {
        let names = TableNames::new(config);
        let store = Arc::new(MemoryStore::with_schema(&names));
        let dyn_store: Arc<dyn RowStore> = store.clone();

        Self {
            state: AppState::new(dyn_store.clone(), &names),
            user_repo: Arc::new(UserRepository::new(dyn_store.clone(), &names)),
            expense_repo: Arc::new(ExpenseRepository::new(dyn_store.clone(), &names)),
            split_repo: Arc::new(SplitRepository::new(dyn_store, &names)),
            store,
            names,
        }
    }

    /// Register a user whose Firebase id is derived from the email
    pub async fn user(&self, email: &str, name: &str) -> User {
        self.state
            .users
            .register(Some(email), Some(&firebase_id(email)), Some(name))
            .await
            .expect("Failed to register test user")
    }

    /// Create an expense of `creator` with one split per `(debtor, amount)`
    pub async fn expense(
        &self,
        creator: &User,
        title: &str,
        total: Decimal,
        splits: &[(&User, Decimal)],
    ) -> (Expense, Vec<Split>) {
        let created = self
            .state
            .expenses
            .create_expense(NewExpense {
                title: Some(title.to_string()),
                total_amount: Some(total),
                firebase_id: Some(creator.firebase_id.clone()),
                splits: splits
                    .iter()
                    .map(|(user, amount)| SplitInput {
                        user_email: Some(user.email.clone()),
                        amount_owed: Some(*amount),
                    })
                    .collect(),
                ..NewExpense::default()
            })
            .await
            .expect("Failed to create test expense");
        (created.expense, created.splits)
    }

    /// Insert an expense and a split with explicit payment timestamps
    pub async fn settled_split(
        &self,
        lender: &User,
        debtor: &User,
        amount: Decimal,
        due_date: Option<DateTime<Utc>>,
        paid_confirmed: Option<DateTime<Utc>>,
    ) -> Split {
        let expense = Expense::new(
            "Settled expense".to_string(),
            amount,
            lender.id,
            None,
            due_date,
            None,
        );
        let expense = self
            .expense_repo
            .create(&expense)
            .await
            .expect("Failed to create expense");

        let mut split = Split::new(expense.id, debtor.id, amount);
        split.paid_request = paid_confirmed.map(|at| at - Duration::hours(1));
        split.paid_confirmed = paid_confirmed;
        self.split_repo
            .create(&split)
            .await
            .expect("Failed to create split")
    }
}

/// Delegates to a [`MemoryStore`] but fails every update addressed to one row id
pub struct FailingUpdates {
    inner: Arc<MemoryStore>,
    row_id: Uuid,
}

impl FailingUpdates {
    pub fn new(inner: Arc<MemoryStore>, row_id: Uuid) -> Self {
        Self { inner, row_id }
    }
}

#[async_trait]
impl RowStore for FailingUpdates {
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        limit: Option<usize>,
    ) -> StoreResult<Vec<Row>> {
        self.inner.select(table, filters, limit).await
    }

    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row> {
        self.inner.insert(table, row).await
    }

    async fn update(&self, table: &str, filters: &[Filter], data: Row) -> StoreResult<Option<Row>> {
        let target = Filter::Eq("id".to_string(), json!(self.row_id));
        if filters.contains(&target) {
            return Err(StoreError::InvalidInput(format!("update of {} refused", self.row_id)));
        }
        self.inner.update(table, filters, data).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> StoreResult<bool> {
        self.inner.delete(table, filters).await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }
}

pub fn firebase_id(email: &str) -> String {
    format!("fb-{}", email.split('@').next().unwrap_or(email))
}

pub fn dec(amount: i64) -> Decimal {
    Decimal::new(amount, 0)
}

pub fn missing_id() -> Uuid {
    Uuid::new_v4()
}
