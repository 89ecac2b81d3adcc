use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::AppError;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UniqueFields;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::ports::UserServicePort;

/// Domain service implementation for user management.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    pub fn new(repository: Arc<UR>) -> Self {
        Self { repository }
    }

    async fn existing(&self, id: &UserId) -> Result<User, AppError> {
        match self.repository.find_by_id(id).await? {
            Some(user) if !user.is_deleted() => Ok(user),
            _ => Err(AppError::not_found("user not found")),
        }
    }
}

/// Keep only the unique fields whose value actually changes.
fn changed_unique_fields(user: &User, command: &UpdateUserCommand) -> UniqueFields {
    UniqueFields {
        username: command
            .username
            .clone()
            .filter(|username| *username != user.username),
        email: command.email.clone().filter(|email| *email != user.email),
        phone: command.phone.clone().filter(|phone| *phone != user.phone),
        exclude: Some(user.id),
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, AppError> {
        self.repository.list(filter).await
    }

    async fn get_user(&self, id: &UserId) -> Result<User, AppError> {
        self.existing(id).await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, AppError> {
        let user = self.existing(id).await?;

        if command.is_empty() {
            return Ok(user);
        }

        let fields = changed_unique_fields(&user, &command);
        if fields.username.is_some() || fields.email.is_some() || fields.phone.is_some() {
            let conflicts = self.repository.check_conflict(&fields).await?;
            if !conflicts.is_empty() {
                return Err(AppError::conflict("conflicting values", conflicts));
            }
        }

        let updated = self.repository.update(id, &command).await?;
        tracing::info!(user_id = %updated.id, "User updated");

        Ok(updated)
    }

    async fn remove_user(&self, id: &UserId) -> Result<(), AppError> {
        self.existing(id).await?;
        self.repository.soft_delete(id).await?;
        tracing::info!(user_id = %id, "User moved to trash");
        Ok(())
    }

    async fn restore_user(&self, id: &UserId) -> Result<User, AppError> {
        match self.repository.find_by_id(id).await? {
            Some(user) if user.is_deleted() => {
                let restored = self.repository.restore(id).await?;
                tracing::info!(user_id = %id, "User restored");
                Ok(restored)
            }
            _ => Err(AppError::not_found("user not found in trash")),
        }
    }

    async fn trashed_users(&self, filter: &UserFilter) -> Result<Vec<User>, AppError> {
        self.repository.trash(filter).await
    }

    async fn prune_user(&self, id: &UserId) -> Result<(), AppError> {
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        if !user.is_deleted() {
            return Err(AppError::validation(
                "user must be removed before it can be pruned",
            ));
        }

        self.repository.prune(id).await?;
        tracing::info!(user_id = %id, "User pruned");
        Ok(())
    }
}
