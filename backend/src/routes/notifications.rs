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

/// `POST /api/notifications/unprocessed`
pub async fn unprocessed(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ActorRequest>,
) -> AppResult<Json<Value>> {
    let notifications = state
        .notifications
        .unprocessed(body.firebase_id.as_deref())
        .await?;
    Ok(Json(json!({ "notifications": notifications })))
}

/// `POST /api/notifications/{id}/processed`
pub async fn mark_processed(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<Value>> {
    let notification = state.notifications.mark_processed(id).await?;
    Ok(Json(json!({ "notification": notification })))
}
