//! Friend request endpoints.
//!
//! Users are addressed by email on this surface.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::AppState;

use super::extract::{ApiJson, ApiQuery};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendPair {
    pub from_email: Option<String>,
    pub to_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
    pub status: Option<String>,
}

/// `POST /api/friends/requests`
pub async fn send_request(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<FriendPair>,
) -> AppResult<Json<Value>> {
    let request = state
        .friends
        .send_request(body.from_email.as_deref(), body.to_email.as_deref())
        .await?;
    Ok(Json(json!({ "request": request })))
}

/// `POST /api/friends/accept`
pub async fn accept(State(state): State<AppState>, ApiJson(body): ApiJson<FriendPair>) -> AppResult<Json<Value>> {
    let request = state
        .friends
        .accept(body.from_email.as_deref(), body.to_email.as_deref())
        .await?;
    Ok(Json(json!({
        "message": "Friend request accepted",
        "request": request,
    })))
}

/// `POST /api/friends/reject`
pub async fn reject(State(state): State<AppState>, ApiJson(body): ApiJson<FriendPair>) -> AppResult<Json<Value>> {
    state
        .friends
        .reject(body.from_email.as_deref(), body.to_email.as_deref())
        .await?;
    Ok(Json(json!({ "message": "Friend request rejected" })))
}

/// `GET /api/friends/requests?email=&status=`
pub async fn list_requests(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EmailQuery>,
) -> AppResult<Json<Value>> {
    let requests = state
        .friends
        .requests_for(query.email.as_deref(), query.status.as_deref())
        .await?;
    Ok(Json(json!({ "requests": requests })))
}

/// `GET /api/friends/requests/incoming?email=`
pub async fn incoming(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EmailQuery>,
) -> AppResult<Json<Value>> {
    let requests = state.friends.incoming(query.email.as_deref()).await?;
    Ok(Json(json!({ "requests": requests })))
}

/// `GET /api/friends/requests/outgoing?email=`
pub async fn outgoing(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EmailQuery>,
) -> AppResult<Json<Value>> {
    let requests = state.friends.outgoing(query.email.as_deref()).await?;
    Ok(Json(json!({ "requests": requests })))
}

/// `GET /api/friends?email=`
pub async fn list_friends(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EmailQuery>,
) -> AppResult<Json<Value>> {
    let friends = state.friends.friends(query.email.as_deref()).await?;
    Ok(Json(json!({ "friends": friends })))
}
