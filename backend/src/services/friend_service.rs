use crate::error::{require_field, AppError, AppResult};
use crate::models::{FriendRequest, RequestStatus, User};
use crate::repositories::{FriendRequestRepository, UserRepository};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Service for friend requests and friend lists
pub struct FriendService {
    request_repo: Arc<FriendRequestRepository>,
    user_repo: Arc<UserRepository>,
}

impl FriendService {
    pub fn new(request_repo: Arc<FriendRequestRepository>, user_repo: Arc<UserRepository>) -> Self {
        Self {
            request_repo,
            user_repo,
        }
    }

    async fn resolve(&self, email: Option<&str>, field: &str) -> AppResult<User> {
        let email = require_field(email, field)?;
        self.user_repo
            .find_by_email(&email.to_lowercase())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with email {} not found", email)))
    }

    async fn resolve_pair(&self, from: Option<&str>, to: Option<&str>) -> AppResult<(User, User)> {
        let from = self.resolve(from, "fromEmail").await?;
        let to = self.resolve(to, "toEmail").await?;
        Ok((from, to))
    }

    /// Send a request; an existing request for the same pair is returned as is
    pub async fn send_request(&self, from: Option<&str>, to: Option<&str>) -> AppResult<FriendRequest> {
        let (from, to) = self.resolve_pair(from, to).await?;
        if from.id == to.id {
            return Err(AppError::Validation(
                "Cannot send a friend request to yourself".to_string(),
            ));
        }

        if let Some(existing) = self.request_repo.find_between(from.id, to.id).await? {
            return Ok(existing);
        }

        let request = self
            .request_repo
            .create(&FriendRequest::new(from.id, to.id))
            .await?;
        info!("Friend request {} sent from {} to {}", request.id, from.id, to.id);
        Ok(request)
    }

    pub async fn accept(&self, from: Option<&str>, to: Option<&str>) -> AppResult<FriendRequest> {
        let (from, to) = self.resolve_pair(from, to).await?;
        let pending = self
            .request_repo
            .find_pending(from.id, to.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

        let accepted = self
            .request_repo
            .mark_completed(pending.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;
        info!("Friend request {} accepted", accepted.id);
        Ok(accepted)
    }

    pub async fn reject(&self, from: Option<&str>, to: Option<&str>) -> AppResult<()> {
        let (from, to) = self.resolve_pair(from, to).await?;
        let pending = self
            .request_repo
            .find_pending(from.id, to.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

        self.request_repo.delete(pending.id).await?;
        info!("Friend request {} rejected", pending.id);
        Ok(())
    }

    /// Pending requests addressed to the user
    pub async fn incoming(&self, email: Option<&str>) -> AppResult<Vec<FriendRequest>> {
        let user = self.resolve(email, "email").await?;
        Ok(self.request_repo.list_to(user.id, Some(false)).await?)
    }

    /// Pending requests sent by the user
    pub async fn outgoing(&self, email: Option<&str>) -> AppResult<Vec<FriendRequest>> {
        let user = self.resolve(email, "email").await?;
        Ok(self.request_repo.list_from(user.id, Some(false)).await?)
    }

    /// Every request involving the user, optionally by status
    pub async fn requests_for(
        &self,
        email: Option<&str>,
        status: Option<&str>,
    ) -> AppResult<Vec<FriendRequest>> {
        let status = status
            .map(RequestStatus::from_str)
            .transpose()
            .map_err(AppError::Validation)?;
        let user = self.resolve(email, "email").await?;

        let mut requests = self.request_repo.list_from(user.id, None).await?;
        requests.extend(self.request_repo.list_to(user.id, None).await?);
        if let Some(status) = status {
            requests.retain(|r| status.matches(r));
        }
        requests.sort_by_key(|r| r.created_at);
        Ok(requests)
    }

    /// Users on the other side of the user's completed requests
    pub async fn friends(&self, email: Option<&str>) -> AppResult<Vec<User>> {
        let user = self.resolve(email, "email").await?;

        let mut requests = self.request_repo.list_from(user.id, Some(true)).await?;
        requests.extend(self.request_repo.list_to(user.id, Some(true)).await?);

        let mut seen = HashSet::new();
        let mut friends = Vec::new();
        for request in requests {
            let friend_id = request.counterpart(user.id);
            if !seen.insert(friend_id) {
                continue;
            }
            if let Some(friend) = self.user_repo.find_by_id(friend_id).await? {
                friends.push(friend);
            }
        }
        Ok(friends)
    }
}
