use crate::credit::{self, CreditScoreBreakdown, SplitRecord};
use crate::error::{AppError, AppResult};
use crate::repositories::{ExpenseRepository, SplitRepository, UserRepository};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Result of recomputing one user's score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditScoreUpdate {
    pub credit_score: Option<i32>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCreditScore {
    pub user_id: Uuid,
    pub credit_score: Option<i32>,
}

/// Aggregate of a full recomputation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchUpdateSummary {
    pub total_users: usize,
    pub updated_users: usize,
    pub failed_users: usize,
    pub users_with_scores: usize,
    pub users_without_history: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub credit_score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboard {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub total_users: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreRanges {
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
}

impl ScoreRanges {
    fn record(&mut self, score: i32) {
        match score {
            s if s >= 750 => self.excellent += 1,
            s if s >= 650 => self.good += 1,
            s if s >= 550 => self.fair += 1,
            _ => self.poor += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditScoreStats {
    pub total_users: usize,
    pub users_with_scores: usize,
    pub users_without_scores: usize,
    pub average_score: Option<f64>,
    pub score_ranges: ScoreRanges,
}

/// Service computing and persisting credit scores
pub struct CreditScoreService {
    user_repo: Arc<UserRepository>,
    split_repo: Arc<SplitRepository>,
    expense_repo: Arc<ExpenseRepository>,
}

impl CreditScoreService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        split_repo: Arc<SplitRepository>,
        expense_repo: Arc<ExpenseRepository>,
    ) -> Self {
        Self {
            user_repo,
            split_repo,
            expense_repo,
        }
    }

    /// The user's splits joined with their expenses; splits whose expense is
    /// gone are dropped
    async fn load_history(&self, user_id: Uuid) -> AppResult<Vec<SplitRecord>> {
        let splits = self.split_repo.raw_for_user(user_id).await?;

        let mut records = Vec::with_capacity(splits.len());
        for split in &splits {
            let expense_id = match split.get("expense_id") {
                Some(Value::String(id)) if !id.is_empty() => id.as_str(),
                _ => continue,
            };
            if let Some(expense) = self.expense_repo.raw_by_id(expense_id).await? {
                records.push(SplitRecord::from_rows(split, &expense));
            }
        }
        Ok(records)
    }

    /// Score with the four factors, `None` without payment history
    pub async fn calculate_breakdown(&self, user_id: Uuid) -> AppResult<Option<CreditScoreBreakdown>> {
        let records = self.load_history(user_id).await?;
        Ok(credit::calculate(&records))
    }

    pub async fn calculate_user_credit_score(&self, user_id: Uuid) -> AppResult<Option<i32>> {
        Ok(self
            .calculate_breakdown(user_id)
            .await?
            .map(|b| b.credit_score))
    }

    /// Recompute and store a user's score (cleared when there is no history)
    pub async fn update_user_credit_score(&self, user_id: Uuid) -> AppResult<CreditScoreUpdate> {
        let credit_score = self.calculate_user_credit_score(user_id).await?;

        self.user_repo
            .set_credit_score(user_id, credit_score)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let message = match credit_score {
            Some(score) => {
                info!("Credit score for user {} updated to {}", user_id, score);
                "Credit score updated successfully"
            }
            None => "No payment history",
        };

        Ok(CreditScoreUpdate {
            credit_score,
            message: message.to_string(),
        })
    }

    pub async fn get_user_credit_score(&self, user_id: Uuid) -> AppResult<UserCreditScore> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(UserCreditScore {
            user_id: user.id,
            credit_score: user.credit_score,
        })
    }

    /// Recompute every user's score; per-user failures are counted, not fatal
    pub async fn update_all_credit_scores(&self) -> AppResult<BatchUpdateSummary> {
        let users = self.user_repo.list_all(None).await?;

        let mut summary = BatchUpdateSummary {
            total_users: users.len(),
            ..BatchUpdateSummary::default()
        };

        for user in &users {
            match self.update_user_credit_score(user.id).await {
                Ok(update) => {
                    summary.updated_users += 1;
                    if update.credit_score.is_some() {
                        summary.users_with_scores += 1;
                    } else {
                        summary.users_without_history += 1;
                    }
                }
                Err(e) => {
                    warn!("Failed to update credit score for user {}: {}", user.id, e);
                    summary.failed_users += 1;
                }
            }
        }

        info!(
            "Credit score batch: {} users, {} updated, {} failed",
            summary.total_users, summary.updated_users, summary.failed_users
        );
        Ok(summary)
    }

    /// Highest scores first, ranked from 1
    pub async fn leaderboard(&self, limit: Option<usize>) -> AppResult<Leaderboard> {
        let limit = limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
        let mut users = self.user_repo.list_scored().await?;
        users.sort_by(|a, b| {
            b.credit_score
                .cmp(&a.credit_score)
                .then(a.date_joined.cmp(&b.date_joined))
        });

        let leaderboard: Vec<LeaderboardEntry> = users
            .into_iter()
            .filter_map(|u| {
                let credit_score = u.credit_score?;
                Some((u, credit_score))
            })
            .take(limit)
            .enumerate()
            .map(|(i, (user, credit_score))| LeaderboardEntry {
                rank: i + 1,
                user_id: user.id,
                name: user.name,
                email: user.email,
                credit_score,
            })
            .collect();

        Ok(Leaderboard {
            total_users: leaderboard.len(),
            leaderboard,
        })
    }

    pub async fn stats(&self) -> AppResult<CreditScoreStats> {
        let total_users = self.user_repo.list_all(None).await?.len();
        let scores: Vec<i32> = self
            .user_repo
            .list_scored()
            .await?
            .into_iter()
            .filter_map(|u| u.credit_score)
            .collect();

        let mut score_ranges = ScoreRanges::default();
        scores.iter().for_each(|&s| score_ranges.record(s));

        let average_score = if scores.is_empty() {
            None
        } else {
            let mean = scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64;
            Some((mean * 100.0).round() / 100.0)
        };

        Ok(CreditScoreStats {
            total_users,
            users_with_scores: scores.len(),
            users_without_scores: total_users.saturating_sub(scores.len()),
            average_score,
            score_ranges,
        })
    }
}
