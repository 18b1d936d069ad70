use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Expense paid by its creator and split among other users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub title: String,
    pub total_amount: Decimal, // NUMERIC(14, 2), always > 0
    pub created_by: Uuid,
    pub group_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new Expense
    pub fn new(
        title: String,
        total_amount: Decimal,
        created_by: Uuid,
        group_id: Option<Uuid>,
        due_date: Option<DateTime<Utc>>,
        category: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            total_amount,
            created_by,
            group_id,
            due_date,
            category,
            created_at: Utc::now(),
        }
    }

    /// Validate the expense amounts
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".to_string());
        }
        if self.total_amount <= Decimal::ZERO {
            return Err("totalAmount must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Payment progress of a split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Unrequested,
    Requested,
    Confirmed,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Unrequested => "unrequested",
            PaymentState::Requested => "requested",
            PaymentState::Confirmed => "confirmed",
        }
    }

    /// Status badge shown to clients: `paid`, `pending` or nothing
    pub fn display_status(&self) -> Option<&'static str> {
        match self {
            PaymentState::Confirmed => Some("paid"),
            PaymentState::Requested => Some("pending"),
            PaymentState::Unrequested => None,
        }
    }
}

/// Portion of an expense owed by one user to the expense's creator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub user_id: Uuid,
    pub amount_owed: Decimal,
    pub paid_request: Option<DateTime<Utc>>,
    pub paid_confirmed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Split {
    /// Create a new unrequested Split
    pub fn new(expense_id: Uuid, user_id: Uuid, amount_owed: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            expense_id,
            user_id,
            amount_owed,
            paid_request: None,
            paid_confirmed: None,
            created_at: Utc::now(),
        }
    }

    pub fn state(&self) -> PaymentState {
        match (self.paid_request, self.paid_confirmed) {
            (_, Some(_)) => PaymentState::Confirmed,
            (Some(_), None) => PaymentState::Requested,
            (None, None) => PaymentState::Unrequested,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.paid_confirmed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_state() {
        let mut split = Split::new(Uuid::new_v4(), Uuid::new_v4(), Decimal::new(1250, 2));
        assert_eq!(split.state(), PaymentState::Unrequested);
        assert_eq!(split.state().display_status(), None);

        split.paid_request = Some(Utc::now());
        assert_eq!(split.state(), PaymentState::Requested);
        assert_eq!(split.state().display_status(), Some("pending"));

        split.paid_confirmed = Some(Utc::now());
        assert_eq!(split.state(), PaymentState::Confirmed);
        assert_eq!(split.state().display_status(), Some("paid"));
        assert!(split.is_confirmed());
    }

    #[test]
    fn test_confirmed_without_request_is_confirmed() {
        let mut split = Split::new(Uuid::new_v4(), Uuid::new_v4(), Decimal::ONE);
        split.paid_confirmed = Some(Utc::now());
        assert_eq!(split.state(), PaymentState::Confirmed);
    }

    #[test]
    fn test_expense_validation() {
        let user = Uuid::new_v4();
        let ok = Expense::new("Dinner".into(), Decimal::new(4200, 2), user, None, None, None);
        assert!(ok.validate().is_ok());

        let zero = Expense::new("Dinner".into(), Decimal::ZERO, user, None, None, None);
        assert!(zero.validate().is_err());

        let untitled = Expense::new("  ".into(), Decimal::ONE, user, None, None, None);
        assert!(untitled.validate().is_err());
    }
}
