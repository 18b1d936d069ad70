//! Group and membership endpoints.
//!
//! - `POST   /api/groups`                   create
//! - `POST   /api/groups/user-groups`       groups the actor belongs to
//! - `POST   /api/groups/created-by-user`   groups the actor created
//! - `GET    /api/groups/{id}`              group with members
//! - `PUT    /api/groups/{id}`              update (creator only)
//! - `DELETE /api/groups/{id}`              delete (creator only)
//! - `GET    /api/groups/{id}/members`      list members
//! - `POST   /api/groups/{id}/members`      add member by email
//! - `POST   /api/groups/{id}/members/remove`

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::group_service::GroupUpdate;
use crate::AppState;

use super::extract::{ApiJson, ApiPath};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub firebase_id: Option<String>,
    pub total_budget: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRequest {
    pub firebase_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupRequest {
    pub firebase_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub total_budget: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
    pub firebase_id: Option<String>,
    pub member_email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub email: Option<String>,
    pub group_id: Option<Uuid>,
}

pub async fn create_group(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateGroupRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let group = state
        .groups
        .create_group(
            body.name.as_deref(),
            body.description.as_deref(),
            body.firebase_id.as_deref(),
            body.total_budget,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Group created successfully",
            "group": group,
        })),
    ))
}

pub async fn user_groups(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ActorRequest>,
) -> AppResult<Json<Value>> {
    let groups = state.groups.user_groups(body.firebase_id.as_deref()).await?;
    Ok(Json(json!({ "groups": groups })))
}

pub async fn created_by_user(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ActorRequest>,
) -> AppResult<Json<Value>> {
    let groups = state
        .groups
        .groups_created_by(body.firebase_id.as_deref())
        .await?;
    Ok(Json(json!({ "groups": groups })))
}

/// `POST /api/groups/notification`: tell a user they were added to a group
pub async fn notify_added(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NotificationRequest>,
) -> AppResult<Json<Value>> {
    let notification = state
        .groups
        .notify_added(body.email.as_deref(), body.group_id)
        .await?;
    Ok(Json(json!({ "notification": notification })))
}

pub async fn get_group(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<Json<Value>> {
    let group = state.groups.get_group(id).await?;
    Ok(Json(json!({ "group": group })))
}

pub async fn update_group(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateGroupRequest>,
) -> AppResult<Json<Value>> {
    let update = GroupUpdate {
        name: body.name,
        description: body.description,
        total_budget: body.total_budget,
    };
    let group = state
        .groups
        .update_group(id, body.firebase_id.as_deref(), update)
        .await?;
    Ok(Json(json!({
        "message": "Group updated successfully",
        "group": group,
    })))
}

pub async fn delete_group(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ActorRequest>,
) -> AppResult<Json<Value>> {
    state
        .groups
        .delete_group(id, body.firebase_id.as_deref())
        .await?;
    Ok(Json(json!({ "message": "Group deleted successfully" })))
}

pub async fn list_members(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<Value>> {
    let members = state.groups.members(id).await?;
    Ok(Json(json!({ "members": members })))
}

pub async fn add_member(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<MemberRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let member = state
        .groups
        .add_member(id, body.firebase_id.as_deref(), body.member_email.as_deref())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Member added successfully",
            "member": member,
        })),
    ))
}

pub async fn remove_member(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<MemberRequest>,
) -> AppResult<Json<Value>> {
    state
        .groups
        .remove_member(id, body.firebase_id.as_deref(), body.member_email.as_deref())
        .await?;
    Ok(Json(json!({ "message": "Member removed successfully" })))
}
