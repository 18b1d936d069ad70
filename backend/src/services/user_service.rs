use crate::error::{require_field, AppError, AppResult};
use crate::models::User;
use crate::repositories::UserRepository;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for registration and profile lookups
pub struct UserService {
    user_repo: Arc<UserRepository>,
}

impl UserService {
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Register a new user; email and Firebase id must both be unused
    pub async fn register(
        &self,
        email: Option<&str>,
        firebase_id: Option<&str>,
        name: Option<&str>,
    ) -> AppResult<User> {
        let email = require_field(email, "email")?;
        let firebase_id = require_field(firebase_id, "firebaseId")?;
        let name = name.map(str::trim).filter(|n| !n.is_empty());

        let user = User::new(
            email.to_lowercase(),
            firebase_id.to_string(),
            name.map(String::from),
        );
        let user = self.user_repo.create(&user).await.map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict("User already exists".to_string()),
            other => other,
        })?;

        info!("Registered user {} ({})", user.id, user.email);
        Ok(user)
    }

    /// Resolve the acting user from a request's `firebaseId`
    pub async fn get_by_firebase_id(&self, firebase_id: Option<&str>) -> AppResult<User> {
        let firebase_id = require_field(firebase_id, "firebaseId")?;
        self.user_repo
            .find_by_firebase_id(firebase_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<User> {
        self.user_repo
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with email {} not found", email)))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn list_all(&self, limit: Option<usize>) -> AppResult<Vec<User>> {
        Ok(self.user_repo.list_all(limit).await?)
    }

    pub async fn update_name(&self, firebase_id: Option<&str>, name: Option<&str>) -> AppResult<User> {
        let firebase_id = require_field(firebase_id, "firebaseId")?;
        let name = require_field(name, "name")?;

        let user = self
            .user_repo
            .update_name(firebase_id, name)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        info!("Updated name of user {}", user.id);
        Ok(user)
    }
}
