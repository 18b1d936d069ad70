use crate::error::{require_field, AppError, AppResult, StoreError};
use crate::models::{Group, Notification, User};
use crate::repositories::{
    GroupMembershipRepository, GroupRepository, NotificationRepository, UserRepository,
};
use crate::store::Row;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// A member of a group with the user's public fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMember {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub joined_at: DateTime<Utc>,
}

/// A group together with its members
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupDetails {
    #[serde(flatten)]
    pub group: Group,
    pub members: Vec<GroupMember>,
}

/// Fields a group's creator may change
#[derive(Debug, Clone, Default)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub total_budget: Option<Decimal>,
}

impl GroupUpdate {
    fn into_row(self) -> AppResult<Row> {
        let mut data = Row::new();
        if let Some(name) = self.name {
            let name = require_field(Some(&name), "name")?;
            data.insert("name".into(), Value::String(name.to_string()));
        }
        if let Some(description) = self.description {
            data.insert("description".into(), Value::String(description));
        }
        if let Some(budget) = self.total_budget {
            data.insert("total_budget".into(), Value::String(budget.to_string()));
        }
        if data.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }
        Ok(data)
    }
}

/// Service for managing groups and their memberships
pub struct GroupService {
    group_repo: Arc<GroupRepository>,
    member_repo: Arc<GroupMembershipRepository>,
    user_repo: Arc<UserRepository>,
    notification_repo: Arc<NotificationRepository>,
}

impl GroupService {
    pub fn new(
        group_repo: Arc<GroupRepository>,
        member_repo: Arc<GroupMembershipRepository>,
        user_repo: Arc<UserRepository>,
        notification_repo: Arc<NotificationRepository>,
    ) -> Self {
        Self {
            group_repo,
            member_repo,
            user_repo,
            notification_repo,
        }
    }

    async fn actor(&self, firebase_id: Option<&str>) -> AppResult<User> {
        let firebase_id = require_field(firebase_id, "firebaseId")?;
        self.user_repo
            .find_by_firebase_id(firebase_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn user_by_email(&self, email: Option<&str>, field: &str) -> AppResult<User> {
        let email = require_field(email, field)?;
        self.user_repo
            .find_by_email(&email.to_lowercase())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with email {} not found", email)))
    }

    async fn find_group(&self, group_id: Uuid) -> AppResult<Group> {
        self.group_repo
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))
    }

    /// Create a group; the creator becomes its first member
    pub async fn create_group(
        &self,
        name: Option<&str>,
        description: Option<&str>,
        firebase_id: Option<&str>,
        total_budget: Option<Decimal>,
    ) -> AppResult<Group> {
        let name = require_field(name, "name")?;
        let creator = self.actor(firebase_id).await?;
        if total_budget.is_some_and(|b| b < Decimal::ZERO) {
            return Err(AppError::Validation("totalBudget cannot be negative".to_string()));
        }

        let group = Group::new(
            name.to_string(),
            description.map(String::from),
            creator.id,
            total_budget,
        );
        let group = self.group_repo.create(&group).await?;
        self.member_repo.add_member(group.id, creator.id).await?;

        info!("Created group {} ({}) for user {}", group.name, group.id, creator.id);
        Ok(group)
    }

    pub async fn get_group(&self, group_id: Uuid) -> AppResult<GroupDetails> {
        let group = self.find_group(group_id).await?;
        let members = self.load_members(group.id).await?;
        Ok(GroupDetails { group, members })
    }

    /// Groups the actor belongs to, each with its members
    pub async fn user_groups(&self, firebase_id: Option<&str>) -> AppResult<Vec<GroupDetails>> {
        let user = self.actor(firebase_id).await?;

        let mut groups = Vec::new();
        for membership in self.member_repo.find_by_user(user.id).await? {
            match self.group_repo.find_by_id(membership.group_id).await? {
                Some(group) => {
                    let members = self.load_members(group.id).await?;
                    groups.push(GroupDetails { group, members });
                }
                None => warn!(
                    "Membership of user {} points at missing group {}",
                    user.id, membership.group_id
                ),
            }
        }
        Ok(groups)
    }

    pub async fn groups_created_by(&self, firebase_id: Option<&str>) -> AppResult<Vec<Group>> {
        let user = self.actor(firebase_id).await?;
        Ok(self.group_repo.list_created_by(user.id).await?)
    }

    pub async fn members(&self, group_id: Uuid) -> AppResult<Vec<GroupMember>> {
        let group = self.find_group(group_id).await?;
        self.load_members(group.id).await
    }

    async fn load_members(&self, group_id: Uuid) -> AppResult<Vec<GroupMember>> {
        let mut members = Vec::new();
        for membership in self.member_repo.find_by_group(group_id).await? {
            if let Some(user) = self.user_repo.find_by_id(membership.user_id).await? {
                members.push(GroupMember {
                    user_id: user.id,
                    email: user.email,
                    name: user.name,
                    joined_at: membership.joined_at,
                });
            }
        }
        Ok(members)
    }

    /// Update a group (creator only)
    pub async fn update_group(
        &self,
        group_id: Uuid,
        firebase_id: Option<&str>,
        update: GroupUpdate,
    ) -> AppResult<Group> {
        let actor = self.actor(firebase_id).await?;
        let group = self.find_group(group_id).await?;
        if !group.is_creator(actor.id) {
            return Err(AppError::Forbidden("Unauthorized to update this group".to_string()));
        }

        let data = update.into_row()?;
        let group = self
            .group_repo
            .update(group_id, data)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        info!("Updated group {}", group.id);
        Ok(group)
    }

    /// Delete a group and its memberships (creator only)
    pub async fn delete_group(&self, group_id: Uuid, firebase_id: Option<&str>) -> AppResult<()> {
        let actor = self.actor(firebase_id).await?;
        let group = self.find_group(group_id).await?;
        if !group.is_creator(actor.id) {
            return Err(AppError::Forbidden("Unauthorized to delete this group".to_string()));
        }

        self.member_repo.remove_all(group_id).await?;
        self.group_repo.delete(group_id).await?;

        info!("Deleted group {}", group_id);
        Ok(())
    }

    /// Add a member by email; only existing members may add others
    pub async fn add_member(
        &self,
        group_id: Uuid,
        firebase_id: Option<&str>,
        member_email: Option<&str>,
    ) -> AppResult<GroupMember> {
        let actor = self.actor(firebase_id).await?;
        let member = self.user_by_email(member_email, "memberEmail").await?;
        self.find_group(group_id).await?;

        if !self.member_repo.is_member(group_id, actor.id).await? {
            return Err(AppError::Forbidden("Only members can add others to a group".to_string()));
        }

        let membership = self
            .member_repo
            .add_member(group_id, member.id)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => {
                    AppError::Conflict("User is already a member of this group".to_string())
                }
                other => other.into(),
            })?;

        info!("Added member {} to group {}", member.id, group_id);
        Ok(GroupMember {
            user_id: member.id,
            email: member.email,
            name: member.name,
            joined_at: membership.joined_at,
        })
    }

    /// Remove a member by email; members may remove anyone, users may leave
    pub async fn remove_member(
        &self,
        group_id: Uuid,
        firebase_id: Option<&str>,
        member_email: Option<&str>,
    ) -> AppResult<()> {
        let actor = self.actor(firebase_id).await?;
        let member = self.user_by_email(member_email, "memberEmail").await?;
        self.find_group(group_id).await?;

        if actor.id != member.id && !self.member_repo.is_member(group_id, actor.id).await? {
            return Err(AppError::Forbidden(
                "Only members can remove others from a group".to_string(),
            ));
        }

        if !self.member_repo.remove_member(group_id, member.id).await? {
            return Err(AppError::NotFound("Membership not found".to_string()));
        }

        info!("Removed member {} from group {}", member.id, group_id);
        Ok(())
    }

    /// Tell a user they were added to a group
    pub async fn notify_added(&self, email: Option<&str>, group_id: Option<Uuid>) -> AppResult<Notification> {
        let user = self.user_by_email(email, "email").await?;
        let group_id =
            group_id.ok_or_else(|| AppError::Validation("groupId is required".to_string()))?;
        let group = self.find_group(group_id).await?;

        let message = format!("You have been added to a new group: {}", group.name);
        let notification = self
            .notification_repo
            .create(&Notification::new(user.id, message))
            .await?;

        info!("Queued group notification {} for user {}", notification.id, user.id);
        Ok(notification)
    }
}
