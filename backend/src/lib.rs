//! Evenly Backend Library
//!
//! This module exposes the backend components for use by tests and other consumers.

pub mod config;
pub mod credit;
pub mod database;
pub mod error;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use config::{AppConfig, StoreConfig};
pub use error::{AppError, AppResult};

use repositories::*;
use services::*;
use std::sync::Arc;
use store::{MemoryStore, RowStore, TableNames};

/// Application state shared by every HTTP handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RowStore>,
    pub users: Arc<UserService>,
    pub friends: Arc<FriendService>,
    pub groups: Arc<GroupService>,
    pub expenses: Arc<ExpenseService>,
    pub payments: Arc<PaymentService>,
    pub notifications: Arc<NotificationService>,
    pub credit_scores: Arc<CreditScoreService>,
}

impl AppState {
    /// Wire repositories and services over a store
    pub fn new(store: Arc<dyn RowStore>, names: &TableNames) -> Self {
        let user_repo = Arc::new(UserRepository::new(store.clone(), names));
        let group_repo = Arc::new(GroupRepository::new(store.clone(), names));
        let member_repo = Arc::new(GroupMembershipRepository::new(store.clone(), names));
        let expense_repo = Arc::new(ExpenseRepository::new(store.clone(), names));
        let split_repo = Arc::new(SplitRepository::new(store.clone(), names));
        let request_repo = Arc::new(FriendRequestRepository::new(store.clone(), names));
        let notification_repo = Arc::new(NotificationRepository::new(store.clone(), names));

        let credit_scores = Arc::new(CreditScoreService::new(
            user_repo.clone(),
            split_repo.clone(),
            expense_repo.clone(),
        ));

        Self {
            users: Arc::new(UserService::new(user_repo.clone())),
            friends: Arc::new(FriendService::new(request_repo, user_repo.clone())),
            groups: Arc::new(GroupService::new(
                group_repo.clone(),
                member_repo,
                user_repo.clone(),
                notification_repo.clone(),
            )),
            expenses: Arc::new(ExpenseService::new(
                expense_repo.clone(),
                split_repo.clone(),
                user_repo.clone(),
                group_repo,
            )),
            payments: Arc::new(PaymentService::new(
                split_repo,
                expense_repo,
                user_repo.clone(),
                credit_scores.clone(),
            )),
            notifications: Arc::new(NotificationService::new(notification_repo, user_repo)),
            credit_scores,
            store,
        }
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory(config: StoreConfig) -> Self {
        let names = TableNames::new(config);
        let store: Arc<dyn RowStore> = Arc::new(MemoryStore::with_schema(&names));
        Self::new(store, &names)
    }
}
