//! Expense and split endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::expense_service::{ExpenseUpdate, NewExpense};
use crate::AppState;

use super::extract::{ApiJson, ApiPath};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRequest {
    pub firebase_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRequest {
    pub firebase_id: Option<String>,
    pub group_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequest {
    pub firebase_id: Option<String>,
    pub title: Option<String>,
    pub total_amount: Option<Decimal>,
    pub due_date: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSplitRequest {
    pub firebase_id: Option<String>,
    pub user_email: Option<String>,
    pub amount_owed: Option<Decimal>,
}

fn require_group(group_id: Option<Uuid>) -> AppResult<Uuid> {
    group_id.ok_or_else(|| AppError::Validation("groupId is required".to_string()))
}

/// `POST /api/expenses`
pub async fn create_expense(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewExpense>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let created = state.expenses.create_expense(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Expense created successfully",
            "expense": created,
        })),
    ))
}

/// `POST /api/expenses/user-expenses`: open lent expenses and owed splits
pub async fn user_expenses(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ActorRequest>,
) -> AppResult<Json<Value>> {
    let user = state
        .users
        .get_by_firebase_id(body.firebase_id.as_deref())
        .await?;

    let lent_expenses = state.expenses.lent_expenses(user.id).await?;
    let owed_splits = state.expenses.owed_splits(user.id).await?;
    let expenses = state.expenses.user_expenses(user.id).await?;

    Ok(Json(json!({
        "lent_expenses": lent_expenses,
        "owed_splits": owed_splits,
        "expenses": expenses,
    })))
}

/// `POST /api/expenses/dashboard`
pub async fn dashboard(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ActorRequest>,
) -> AppResult<Json<Value>> {
    let user = state
        .users
        .get_by_firebase_id(body.firebase_id.as_deref())
        .await?;
    let dashboard = state.expenses.dashboard(user.id).await?;
    Ok(Json(json!({ "dashboard": dashboard })))
}

/// `POST /api/expenses/group-expenses`
pub async fn group_expenses(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GroupRequest>,
) -> AppResult<Json<Value>> {
    let group_id = require_group(body.group_id)?;
    let expenses = state.expenses.group_expenses(group_id).await?;
    Ok(Json(json!({ "expenses": expenses })))
}

/// `POST /api/expenses/user-group-expenses`
pub async fn user_group_expenses(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GroupRequest>,
) -> AppResult<Json<Value>> {
    let group_id = require_group(body.group_id)?;
    let user = state
        .users
        .get_by_firebase_id(body.firebase_id.as_deref())
        .await?;

    let expenses = state.expenses.user_group_expenses(user.id, group_id).await?;
    Ok(Json(json!(expenses)))
}

pub async fn get_expense(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<Json<Value>> {
    let expense = state.expenses.get_expense(id).await?;
    Ok(Json(json!({ "expense": expense })))
}

pub async fn update_expense(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateExpenseRequest>,
) -> AppResult<Json<Value>> {
    let update = ExpenseUpdate {
        title: body.title,
        total_amount: body.total_amount,
        due_date: body.due_date,
        category: body.category,
    };
    let expense = state
        .expenses
        .update_expense(id, body.firebase_id.as_deref(), update)
        .await?;
    Ok(Json(json!({
        "message": "Expense updated successfully",
        "expense": expense,
    })))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ActorRequest>,
) -> AppResult<Json<Value>> {
    state
        .expenses
        .delete_expense(id, body.firebase_id.as_deref())
        .await?;
    Ok(Json(json!({ "message": "Expense deleted successfully" })))
}

/// `POST /api/expenses/{id}/splits`
pub async fn add_split(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<AddSplitRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let split = state
        .expenses
        .add_split(
            id,
            body.firebase_id.as_deref(),
            body.user_email.as_deref(),
            body.amount_owed,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "split": split }))))
}
