//! Read-only dashboard endpoints keyed by `?user_id=`.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::AppState;

use super::extract::ApiQuery;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<Uuid>,
}

impl UserQuery {
    fn user_id(&self) -> AppResult<Uuid> {
        self.user_id
            .ok_or_else(|| AppError::Validation("user_id is required".to_string()))
    }
}

/// `GET /api/dashboard?user_id=`
pub async fn summary(State(state): State<AppState>, ApiQuery(query): ApiQuery<UserQuery>) -> AppResult<Json<Value>> {
    let user = state.users.get_by_id(query.user_id()?).await?;
    let dashboard = state.expenses.dashboard(user.id).await?;
    Ok(Json(json!(dashboard)))
}

/// `GET /api/dashboard/lent?user_id=`
pub async fn lent(State(state): State<AppState>, ApiQuery(query): ApiQuery<UserQuery>) -> AppResult<Json<Value>> {
    let user = state.users.get_by_id(query.user_id()?).await?;
    let expenses = state.expenses.lent_expenses(user.id).await?;
    Ok(Json(json!({ "lent_expenses": expenses })))
}

/// `GET /api/dashboard/owed?user_id=`
pub async fn owed(State(state): State<AppState>, ApiQuery(query): ApiQuery<UserQuery>) -> AppResult<Json<Value>> {
    let user = state.users.get_by_id(query.user_id()?).await?;
    let splits = state.expenses.owed_splits(user.id).await?;
    Ok(Json(json!({ "owed_splits": splits })))
}
