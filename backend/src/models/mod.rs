//! Domain models for the Evenly backend.
//!
//! Each model maps one-to-one onto a table row and crosses the store
//! boundary through serde.

pub mod expense;
pub mod friend_request;
pub mod group;
pub mod notification;
pub mod user;

// Re-export all models for convenient access
pub use expense::{Expense, PaymentState, Split};
pub use friend_request::{FriendRequest, RequestStatus};
pub use group::{Group, GroupMembership};
pub use notification::Notification;
pub use user::{User, UserSummary, MAX_CREDIT_SCORE, MIN_CREDIT_SCORE};
