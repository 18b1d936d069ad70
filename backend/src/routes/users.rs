//! Registration and profile endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppResult;
use crate::AppState;

use super::extract::{ApiJson, ApiPath};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub firebase_id: Option<String>,
    pub name: Option<String>,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let user = state
        .users
        .register(
            body.email.as_deref(),
            body.firebase_id.as_deref(),
            body.name.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": user,
        })),
    ))
}

/// `GET /api/users/{id}`
pub async fn get_user(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<Json<Value>> {
    let user = state.users.get_by_id(id).await?;
    Ok(Json(json!({ "user": user })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNameRequest {
    pub firebase_id: Option<String>,
    pub name: Option<String>,
}

/// `PUT /api/users/name`
pub async fn update_name(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateNameRequest>,
) -> AppResult<Json<Value>> {
    let user = state
        .users
        .update_name(body.firebase_id.as_deref(), body.name.as_deref())
        .await?;
    Ok(Json(json!({
        "message": "Name updated successfully",
        "user": user,
    })))
}
