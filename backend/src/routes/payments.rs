//! Payment workflow endpoints.
//!
//! - `POST /api/splits/{id}/request`  debtor asks for confirmation
//! - `POST /api/splits/{id}/confirm`  lender confirms
//! - `POST /api/splits/{id}/reject`   lender rejects
//! - `POST /api/payments/pending`     lender's open requests

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppResult;
use crate::AppState;

use super::extract::{ApiJson, ApiPath};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRequest {
    pub firebase_id: Option<String>,
}

pub async fn request_payment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ActorRequest>,
) -> AppResult<Json<Value>> {
    let split = state
        .payments
        .request_payment(id, body.firebase_id.as_deref())
        .await?;
    Ok(Json(json!({
        "message": "Payment confirmation requested",
        "split": split,
    })))
}

pub async fn confirm_payment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ActorRequest>,
) -> AppResult<Json<Value>> {
    let split = state
        .payments
        .confirm_payment(id, body.firebase_id.as_deref())
        .await?;
    Ok(Json(json!({
        "message": "Payment confirmed",
        "split": split,
    })))
}

pub async fn reject_payment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ActorRequest>,
) -> AppResult<Json<Value>> {
    let split = state
        .payments
        .reject_payment(id, body.firebase_id.as_deref())
        .await?;
    Ok(Json(json!({
        "message": "Payment request rejected",
        "split": split,
    })))
}

pub async fn pending_requests(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ActorRequest>,
) -> AppResult<Json<Value>> {
    let pending = state
        .payments
        .pending_requests(body.firebase_id.as_deref())
        .await?;
    Ok(Json(json!({ "pending_requests": pending })))
}
