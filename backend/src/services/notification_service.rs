use crate::error::{option_to_result, require_field, AppError, AppResult};
use crate::models::Notification;
use crate::repositories::{NotificationRepository, UserRepository};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for in-app notifications
pub struct NotificationService {
    notification_repo: Arc<NotificationRepository>,
    user_repo: Arc<UserRepository>,
}

impl NotificationService {
    pub fn new(notification_repo: Arc<NotificationRepository>, user_repo: Arc<UserRepository>) -> Self {
        Self {
            notification_repo,
            user_repo,
        }
    }

    pub async fn insert(&self, user_id: Uuid, message: &str) -> AppResult<Notification> {
        let message = require_field(Some(message), "message")?;
        let notification = self
            .notification_repo
            .create(&Notification::new(user_id, message.to_string()))
            .await?;
        info!("Queued notification {} for user {}", notification.id, user_id);
        Ok(notification)
    }

    /// Unprocessed notifications of the user behind `firebase_id`
    pub async fn unprocessed(&self, firebase_id: Option<&str>) -> AppResult<Vec<Notification>> {
        let firebase_id = require_field(firebase_id, "firebaseId")?;
        let user = self
            .user_repo
            .find_by_firebase_id(firebase_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(self.notification_repo.list_unprocessed(user.id).await?)
    }

    pub async fn mark_processed(&self, notification_id: Uuid) -> AppResult<Notification> {
        option_to_result(
            self.notification_repo.mark_processed(notification_id).await?,
            "Notification not found",
        )
    }
}
