use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status filter for listing friend requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Completed,
}

impl RequestStatus {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "completed" => Ok(RequestStatus::Completed),
            _ => Err(format!("Invalid status: {}. Must be pending or completed", s)),
        }
    }

    pub fn matches(&self, request: &FriendRequest) -> bool {
        match self {
            RequestStatus::Pending => !request.request_completed,
            RequestStatus::Completed => request.request_completed,
        }
    }
}

/// Directed friend request; `request_completed` flips once accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub request_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl FriendRequest {
    pub fn new(from_user: Uuid, to_user: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_user,
            to_user,
            request_completed: false,
            created_at: Utc::now(),
        }
    }

    /// The user on the other side of the request
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.from_user == user_id {
            self.to_user
        } else {
            self.from_user
        }
    }
}
