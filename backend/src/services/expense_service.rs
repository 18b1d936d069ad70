use crate::credit::parse_timestamp;
use crate::error::{require_field, AppError, AppResult};
use crate::models::{Expense, Split, User, UserSummary};
use crate::repositories::{ExpenseRepository, GroupRepository, SplitRepository, UserRepository};
use crate::store::Row;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// One requested split of a new expense
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitInput {
    pub user_email: Option<String>,
    pub amount_owed: Option<Decimal>,
}

/// Body of an expense creation request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub title: Option<String>,
    pub total_amount: Option<Decimal>,
    pub firebase_id: Option<String>,
    pub group_id: Option<Uuid>,
    pub due_date: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub splits: Vec<SplitInput>,
}

/// Fields an expense's creator may change
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    pub title: Option<String>,
    pub total_amount: Option<Decimal>,
    pub due_date: Option<String>,
    pub category: Option<String>,
}

impl ExpenseUpdate {
    fn into_row(self) -> AppResult<Row> {
        let mut data = Row::new();
        if let Some(title) = self.title {
            let title = require_field(Some(&title), "title")?;
            data.insert("title".into(), Value::String(title.to_string()));
        }
        if let Some(amount) = self.total_amount {
            if amount <= Decimal::ZERO {
                return Err(AppError::Validation(
                    "totalAmount must be greater than zero".to_string(),
                ));
            }
            data.insert("total_amount".into(), Value::String(amount.to_string()));
        }
        if let Some(due_date) = self.due_date {
            // blank clears the due date
            let due_date = parse_due_date(Some(&due_date))?
                .map_or(Value::Null, |d| Value::String(d.to_rfc3339()));
            data.insert("due_date".into(), due_date);
        }
        if let Some(category) = self.category {
            data.insert("category".into(), Value::String(category));
        }
        if data.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }
        Ok(data)
    }
}

fn parse_due_date(raw: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_timestamp(s)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Invalid dueDate: {}", s))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitDebtor {
    pub name: Option<String>,
    pub payment_status: Option<&'static str>,
}

/// Split as shown on an expense: debtor name and status badge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedSplit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_owed: Decimal,
    pub paid_request: Option<DateTime<Utc>>,
    pub paid_confirmed: Option<DateTime<Utc>>,
    pub debtor: SplitDebtor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseWithSplits {
    #[serde(flatten)]
    pub expense: Expense,
    pub splits: Vec<EnrichedSplit>,
}

impl ExpenseWithSplits {
    /// Fully paid once every split is confirmed; no splits means not paid
    pub fn is_fully_paid(&self) -> bool {
        !self.splits.is_empty() && self.splits.iter().all(|s| s.paid_confirmed.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedExpense {
    #[serde(flatten)]
    pub expense: Expense,
    pub splits: Vec<Split>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwedExpense {
    pub id: Uuid,
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
    pub lender: Option<UserSummary>,
}

/// Unconfirmed split of the user with what it is for and who is owed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwedSplit {
    #[serde(flatten)]
    pub split: Split,
    pub expense: OwedExpense,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LentSummary {
    pub total_amount: Decimal,
    pub expenses: Vec<ExpenseWithSplits>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwedSummary {
    pub total_amount: Decimal,
    pub splits: Vec<OwedSplit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetSummary {
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub lent: LentSummary,
    pub owed: OwedSummary,
    pub net: NetSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserGroupExpenses {
    pub created: Vec<ExpenseWithSplits>,
    pub owed: Vec<ExpenseWithSplits>,
}

/// Service for expenses, their splits and the balances derived from them
pub struct ExpenseService {
    expense_repo: Arc<ExpenseRepository>,
    split_repo: Arc<SplitRepository>,
    user_repo: Arc<UserRepository>,
    group_repo: Arc<GroupRepository>,
}

impl ExpenseService {
    pub fn new(
        expense_repo: Arc<ExpenseRepository>,
        split_repo: Arc<SplitRepository>,
        user_repo: Arc<UserRepository>,
        group_repo: Arc<GroupRepository>,
    ) -> Self {
        Self {
            expense_repo,
            split_repo,
            user_repo,
            group_repo,
        }
    }

    async fn actor(&self, firebase_id: Option<&str>) -> AppResult<User> {
        let firebase_id = require_field(firebase_id, "firebaseId")?;
        self.user_repo
            .find_by_firebase_id(firebase_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn find_expense(&self, expense_id: Uuid) -> AppResult<Expense> {
        self.expense_repo
            .find_by_id(expense_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Expense not found".to_string()))
    }

    async fn owned_expense(&self, expense_id: Uuid, actor: &User, action: &str) -> AppResult<Expense> {
        let expense = self.find_expense(expense_id).await?;
        if expense.created_by != actor.id {
            return Err(AppError::Forbidden(format!(
                "Unauthorized to {} this expense",
                action
            )));
        }
        Ok(expense)
    }

    /// Create an expense and fan its splits out as independent inserts.
    ///
    /// Split entries with a missing field or an unknown email are skipped.
    /// When the expense belongs to a group with a budget, the budget is
    /// reduced by the expense amount.
    pub async fn create_expense(&self, request: NewExpense) -> AppResult<CreatedExpense> {
        let title = require_field(request.title.as_deref(), "title")?.to_string();
        let total_amount = request
            .total_amount
            .ok_or_else(|| AppError::Validation("totalAmount is required".to_string()))?;
        let creator = self.actor(request.firebase_id.as_deref()).await?;
        let due_date = parse_due_date(request.due_date.as_deref())?;

        let group = match request.group_id {
            Some(group_id) => Some(
                self.group_repo
                    .find_by_id(group_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?,
            ),
            None => None,
        };

        let expense = Expense::new(
            title,
            total_amount,
            creator.id,
            request.group_id,
            due_date,
            request.category.filter(|c| !c.trim().is_empty()),
        );
        expense.validate().map_err(AppError::Validation)?;
        let expense = self.expense_repo.create(&expense).await?;

        let mut splits = Vec::with_capacity(request.splits.len());
        for input in &request.splits {
            let (Some(email), Some(amount)) = (input.user_email.as_deref(), input.amount_owed) else {
                warn!("Skipping incomplete split entry on expense {}", expense.id);
                continue;
            };
            if amount < Decimal::ZERO {
                warn!("Skipping negative split for {} on expense {}", email, expense.id);
                continue;
            }
            let Some(debtor) = self.user_repo.find_by_email(&email.trim().to_lowercase()).await? else {
                warn!("Skipping split for unknown user {} on expense {}", email, expense.id);
                continue;
            };
            let split = self
                .split_repo
                .create(&Split::new(expense.id, debtor.id, amount))
                .await?;
            splits.push(split);
        }

        if let Some(group) = group {
            if let Some(budget) = group.total_budget {
                self.group_repo
                    .set_budget(group.id, budget - expense.total_amount)
                    .await?;
            }
        }

        info!(
            "Created expense {} ({}) with {} splits",
            expense.id,
            expense.total_amount,
            splits.len()
        );
        Ok(CreatedExpense { expense, splits })
    }

    async fn enrich(&self, expense: Expense) -> AppResult<ExpenseWithSplits> {
        let splits = self.split_repo.list_for_expense(expense.id).await?;
        let mut enriched = Vec::with_capacity(splits.len());
        for split in splits {
            enriched.push(self.enrich_split(split).await?);
        }
        Ok(ExpenseWithSplits {
            expense,
            splits: enriched,
        })
    }

    async fn enrich_split(&self, split: Split) -> AppResult<EnrichedSplit> {
        let debtor = self.user_repo.find_by_id(split.user_id).await?;
        Ok(EnrichedSplit {
            id: split.id,
            user_id: split.user_id,
            amount_owed: split.amount_owed,
            paid_request: split.paid_request,
            paid_confirmed: split.paid_confirmed,
            debtor: SplitDebtor {
                name: debtor.and_then(|u| u.name),
                payment_status: split.state().display_status(),
            },
        })
    }

    pub async fn get_expense(&self, expense_id: Uuid) -> AppResult<ExpenseWithSplits> {
        let expense = self.find_expense(expense_id).await?;
        self.enrich(expense).await
    }

    /// Update an expense (creator only)
    pub async fn update_expense(
        &self,
        expense_id: Uuid,
        firebase_id: Option<&str>,
        update: ExpenseUpdate,
    ) -> AppResult<Expense> {
        let actor = self.actor(firebase_id).await?;
        self.owned_expense(expense_id, &actor, "update").await?;

        let data = update.into_row()?;
        let expense = self
            .expense_repo
            .update(expense_id, data)
            .await?
            .ok_or_else(|| AppError::NotFound("Expense not found".to_string()))?;

        info!("Updated expense {}", expense.id);
        Ok(expense)
    }

    /// Delete an expense and its splits (creator only)
    pub async fn delete_expense(&self, expense_id: Uuid, firebase_id: Option<&str>) -> AppResult<()> {
        let actor = self.actor(firebase_id).await?;
        self.owned_expense(expense_id, &actor, "delete").await?;

        self.split_repo.delete_for_expense(expense_id).await?;
        self.expense_repo.delete(expense_id).await?;

        info!("Deleted expense {}", expense_id);
        Ok(())
    }

    /// Add one split to an existing expense (creator only)
    pub async fn add_split(
        &self,
        expense_id: Uuid,
        firebase_id: Option<&str>,
        user_email: Option<&str>,
        amount_owed: Option<Decimal>,
    ) -> AppResult<Split> {
        let user_email = require_field(user_email, "userEmail")?;
        let amount_owed =
            amount_owed.ok_or_else(|| AppError::Validation("amountOwed is required".to_string()))?;
        if amount_owed < Decimal::ZERO {
            return Err(AppError::Validation("amountOwed cannot be negative".to_string()));
        }

        let actor = self.actor(firebase_id).await?;
        let expense = self.owned_expense(expense_id, &actor, "modify").await?;
        let debtor = self
            .user_repo
            .find_by_email(&user_email.to_lowercase())
            .await?
            .ok_or_else(|| AppError::NotFound("Split user not found".to_string()))?;

        let split = self
            .split_repo
            .create(&Split::new(expense.id, debtor.id, amount_owed))
            .await?;
        info!("Added split {} to expense {}", split.id, expense.id);
        Ok(split)
    }

    /// Expenses the user created that are not fully paid yet
    pub async fn lent_expenses(&self, user_id: Uuid) -> AppResult<Vec<ExpenseWithSplits>> {
        let mut lent = Vec::new();
        for expense in self.expense_repo.list_created_by(user_id).await? {
            let expense = self.enrich(expense).await?;
            if !expense.is_fully_paid() {
                lent.push(expense);
            }
        }
        Ok(lent)
    }

    /// The user's unconfirmed splits with the expense and lender behind each
    pub async fn owed_splits(&self, user_id: Uuid) -> AppResult<Vec<OwedSplit>> {
        let mut owed = Vec::new();
        for split in self.split_repo.list_for_user(user_id).await? {
            if split.is_confirmed() {
                continue;
            }
            let Some(expense) = self.expense_repo.find_by_id(split.expense_id).await? else {
                continue;
            };
            let lender = self
                .user_repo
                .find_by_id(expense.created_by)
                .await?
                .map(|u| UserSummary::from(&u));
            owed.push(OwedSplit {
                split,
                expense: OwedExpense {
                    id: expense.id,
                    title: expense.title,
                    due_date: expense.due_date,
                    lender,
                },
            });
        }
        Ok(owed)
    }

    pub async fn dashboard(&self, user_id: Uuid) -> AppResult<Dashboard> {
        let expenses = self.lent_expenses(user_id).await?;
        let splits = self.owed_splits(user_id).await?;

        let lent_total: Decimal = expenses.iter().map(|e| e.expense.total_amount).sum();
        let owed_total: Decimal = splits.iter().map(|s| s.split.amount_owed).sum();

        Ok(Dashboard {
            lent: LentSummary {
                total_amount: lent_total,
                expenses,
            },
            owed: OwedSummary {
                total_amount: owed_total,
                splits,
            },
            net: NetSummary {
                total_amount: lent_total - owed_total,
            },
        })
    }

    pub async fn group_expenses(&self, group_id: Uuid) -> AppResult<Vec<ExpenseWithSplits>> {
        let mut expenses = Vec::new();
        for expense in self.expense_repo.list_for_group(group_id).await? {
            expenses.push(self.enrich(expense).await?);
        }
        Ok(expenses)
    }

    /// Within one group: open expenses the user created, and expenses where
    /// the user still owes (carrying only the user's split)
    pub async fn user_group_expenses(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> AppResult<UserGroupExpenses> {
        let mut created = Vec::new();
        for expense in self
            .expense_repo
            .list_created_by_in_group(user_id, group_id)
            .await?
        {
            let expense = self.enrich(expense).await?;
            if !expense.is_fully_paid() {
                created.push(expense);
            }
        }

        let mut owed = Vec::new();
        for split in self.split_repo.list_for_user(user_id).await? {
            if split.is_confirmed() {
                continue;
            }
            let Some(expense) = self.expense_repo.find_by_id(split.expense_id).await? else {
                continue;
            };
            if expense.group_id != Some(group_id) {
                continue;
            }
            owed.push(ExpenseWithSplits {
                expense,
                splits: vec![self.enrich_split(split).await?],
            });
        }

        Ok(UserGroupExpenses { created, owed })
    }

    /// Every expense the user created or has a split in, without duplicates
    pub async fn user_expenses(&self, user_id: Uuid) -> AppResult<Vec<Expense>> {
        let mut expenses = self.expense_repo.list_created_by(user_id).await?;
        let mut seen: HashSet<Uuid> = expenses.iter().map(|e| e.id).collect();

        for split in self.split_repo.list_for_user(user_id).await? {
            if !seen.insert(split.expense_id) {
                continue;
            }
            if let Some(expense) = self.expense_repo.find_by_id(split.expense_id).await? {
                expenses.push(expense);
            }
        }
        Ok(expenses)
    }
}
