use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// In-app message waiting to be shown to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: Uuid, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            message,
            processed: false,
            created_at: Utc::now(),
        }
    }
}
