pub mod expense_repository;
pub mod friend_request_repository;
pub mod group_membership_repository;
pub mod group_repository;
pub mod notification_repository;
pub mod split_repository;
pub mod user_repository;

// Re-export all repositories for convenient access
pub use expense_repository::ExpenseRepository;
pub use friend_request_repository::FriendRequestRepository;
pub use group_membership_repository::GroupMembershipRepository;
pub use group_repository::GroupRepository;
pub use notification_repository::NotificationRepository;
pub use split_repository::SplitRepository;
pub use user_repository::UserRepository;

use crate::error::StoreResult;
use crate::store::{from_row, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

fn decode_all<T: DeserializeOwned>(rows: Vec<Row>) -> StoreResult<Vec<T>> {
    rows.into_iter().map(from_row).collect()
}

fn decode_first<T: DeserializeOwned>(rows: Vec<Row>) -> StoreResult<Option<T>> {
    rows.into_iter().next().map(from_row).transpose()
}

/// Build the `data` row of an update from column/value pairs
fn columns<const N: usize>(pairs: [(&str, Value); N]) -> Row {
    pairs
        .into_iter()
        .map(|(column, value)| (column.to_string(), value))
        .collect()
}

fn value<T: Serialize>(v: T) -> StoreResult<Value> {
    Ok(serde_json::to_value(v)?)
}
