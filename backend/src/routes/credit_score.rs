//! Credit score endpoints.
//!
//! Scores are recomputed on demand (`calculate`, `calculate-all`) and after
//! every confirmed payment; reads return the stored value.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppResult;
use crate::AppState;

use super::extract::{ApiPath, ApiQuery};

/// `limit` falls back to the default when it is not a number
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<String>,
}

impl LeaderboardQuery {
    fn limit(&self) -> Option<usize> {
        self.limit.as_deref().and_then(|l| l.trim().parse().ok())
    }
}

/// `GET /api/credit-score/user/{id}`
pub async fn get_score(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<Json<Value>> {
    let score = state.credit_scores.get_user_credit_score(id).await?;
    Ok(Json(json!(score)))
}

/// `POST /api/credit-score/calculate/{id}`
pub async fn calculate(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<Json<Value>> {
    let update = state.credit_scores.update_user_credit_score(id).await?;
    Ok(Json(json!({
        "user_id": id,
        "credit_score": update.credit_score,
        "message": update.message,
    })))
}

/// `POST /api/credit-score/calculate-all`
pub async fn calculate_all(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let summary = state.credit_scores.update_all_credit_scores().await?;
    Ok(Json(json!({
        "message": "Credit scores recalculated",
        "summary": summary,
    })))
}

/// `GET /api/credit-score/leaderboard?limit=`
pub async fn leaderboard(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LeaderboardQuery>,
) -> AppResult<Json<Value>> {
    let leaderboard = state.credit_scores.leaderboard(query.limit()).await?;
    Ok(Json(json!(leaderboard)))
}

/// `GET /api/credit-score/stats`
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let stats = state.credit_scores.stats().await?;
    Ok(Json(json!(stats)))
}
