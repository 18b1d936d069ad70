use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_CREDIT_SCORE: i32 = 300;
pub const MAX_CREDIT_SCORE: i32 = 850;

/// User account, identified externally by its Firebase id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub firebase_id: String,
    pub name: Option<String>,
    pub credit_score: Option<i32>, // NULL until the user has payment history
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Create a new User (typically used for creating from API input)
    pub fn new(email: String, firebase_id: String, name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            firebase_id,
            name,
            credit_score: None,
            date_joined: Utc::now(),
        }
    }
}

/// The `{id, name}` pair embedded in enriched responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}
