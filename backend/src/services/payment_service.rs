use super::CreditScoreService;
use crate::error::{option_to_result, require_field, AppError, AppResult};
use crate::models::{Expense, PaymentState, Split, User, UserSummary};
use crate::repositories::{ExpenseRepository, SplitRepository, UserRepository};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingExpense {
    pub id: Uuid,
    pub title: String,
}

/// A payment request waiting for the lender's confirmation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingPayment {
    pub id: Uuid,
    pub amount_owed: Decimal,
    pub paid_request: Option<DateTime<Utc>>,
    pub debtor: UserSummary,
    pub expense: PendingExpense,
}

/// Service driving the per-split payment workflow:
/// `Unrequested -> Requested -> Confirmed`, with reject going back to
/// `Unrequested`
pub struct PaymentService {
    split_repo: Arc<SplitRepository>,
    expense_repo: Arc<ExpenseRepository>,
    user_repo: Arc<UserRepository>,
    credit_scores: Arc<CreditScoreService>,
}

impl PaymentService {
    pub fn new(
        split_repo: Arc<SplitRepository>,
        expense_repo: Arc<ExpenseRepository>,
        user_repo: Arc<UserRepository>,
        credit_scores: Arc<CreditScoreService>,
    ) -> Self {
        Self {
            split_repo,
            expense_repo,
            user_repo,
            credit_scores,
        }
    }

    async fn actor(&self, firebase_id: Option<&str>) -> AppResult<User> {
        let firebase_id = require_field(firebase_id, "firebaseId")?;
        self.user_repo
            .find_by_firebase_id(firebase_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn find_split(&self, split_id: Uuid) -> AppResult<Split> {
        option_to_result(self.split_repo.find_by_id(split_id).await?, "Split not found")
    }

    /// The split and its expense, provided the actor created the expense
    async fn lender_split(&self, split_id: Uuid, lender: &User) -> AppResult<(Split, Expense)> {
        let split = self.find_split(split_id).await?;
        let expense = self
            .expense_repo
            .find_by_id(split.expense_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Expense not found".to_string()))?;
        if expense.created_by != lender.id {
            return Err(AppError::Forbidden(
                "Only the expense creator can settle this split".to_string(),
            ));
        }
        Ok((split, expense))
    }

    fn expect_state(split: &Split, expected: PaymentState) -> AppResult<()> {
        let state = split.state();
        if state != expected {
            return Err(AppError::Conflict(format!(
                "Split {} is {}, expected {}",
                split.id,
                state.as_str(),
                expected.as_str()
            )));
        }
        Ok(())
    }

    /// Debtor marks the split as paid and asks the lender to confirm
    pub async fn request_payment(&self, split_id: Uuid, firebase_id: Option<&str>) -> AppResult<Split> {
        let debtor = self.actor(firebase_id).await?;
        let split = self.find_split(split_id).await?;
        if split.user_id != debtor.id {
            return Err(AppError::Forbidden(
                "Only the debtor can request payment confirmation".to_string(),
            ));
        }
        Self::expect_state(&split, PaymentState::Unrequested)?;

        let split = self
            .split_repo
            .set_paid_request(split.id, Some(Utc::now()))
            .await?
            .ok_or_else(|| AppError::NotFound("Split not found".to_string()))?;

        info!("Payment requested on split {} by user {}", split.id, debtor.id);
        Ok(split)
    }

    /// Lender confirms receipt; the debtor's credit score is refreshed
    pub async fn confirm_payment(&self, split_id: Uuid, firebase_id: Option<&str>) -> AppResult<Split> {
        let lender = self.actor(firebase_id).await?;
        let (split, _) = self.lender_split(split_id, &lender).await?;
        Self::expect_state(&split, PaymentState::Requested)?;

        let split = self
            .split_repo
            .set_paid_confirmed(split.id, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Split not found".to_string()))?;
        info!("Payment confirmed on split {} by user {}", split.id, lender.id);

        if let Err(e) = self.credit_scores.update_user_credit_score(split.user_id).await {
            warn!("Credit score refresh failed for user {}: {}", split.user_id, e);
        }

        Ok(split)
    }

    /// Lender declines the request; the split goes back to unrequested
    pub async fn reject_payment(&self, split_id: Uuid, firebase_id: Option<&str>) -> AppResult<Split> {
        let lender = self.actor(firebase_id).await?;
        let (split, _) = self.lender_split(split_id, &lender).await?;
        Self::expect_state(&split, PaymentState::Requested)?;

        let split = self
            .split_repo
            .set_paid_request(split.id, None)
            .await?
            .ok_or_else(|| AppError::NotFound("Split not found".to_string()))?;

        info!("Payment request on split {} rejected by user {}", split.id, lender.id);
        Ok(split)
    }

    /// Requested but unconfirmed splits across the lender's expenses
    pub async fn pending_requests(&self, firebase_id: Option<&str>) -> AppResult<Vec<PendingPayment>> {
        let lender = self.actor(firebase_id).await?;

        let mut pending = Vec::new();
        for expense in self.expense_repo.list_created_by(lender.id).await? {
            for split in self.split_repo.list_pending_for_expense(expense.id).await? {
                let Some(debtor) = self.user_repo.find_by_id(split.user_id).await? else {
                    continue;
                };
                pending.push(PendingPayment {
                    id: split.id,
                    amount_owed: split.amount_owed,
                    paid_request: split.paid_request,
                    debtor: UserSummary::from(&debtor),
                    expense: PendingExpense {
                        id: expense.id,
                        title: expense.title.clone(),
                    },
                });
            }
        }
        Ok(pending)
    }
}
