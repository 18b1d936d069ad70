use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Group of users sharing expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub total_budget: Option<Decimal>, // NUMERIC(14, 2), decremented as expenses land
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Create a new Group
    pub fn new(
        name: String,
        description: Option<String>,
        created_by: Uuid,
        total_budget: Option<Decimal>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            created_by,
            total_budget,
            created_at: Utc::now(),
        }
    }

    pub fn is_creator(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }
}

/// A user's membership in a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

impl GroupMembership {
    pub fn new(group_id: Uuid, user_id: Uuid) -> Self {
        Self {
            group_id,
            user_id,
            joined_at: Utc::now(),
        }
    }
}
