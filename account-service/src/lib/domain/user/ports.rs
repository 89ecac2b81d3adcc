use async_trait::async_trait;

use crate::domain::errors::AppError;
use crate::domain::errors::FieldError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PhoneNumber;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;

/// Candidate values for the unique user attributes.
///
/// Unset fields are not checked. `exclude` skips the user's own row when
/// checking an update.
#[derive(Debug, Clone, Default)]
pub struct UniqueFields {
    pub username: Option<Username>,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub exclude: Option<UserId>,
}

/// Port for user management operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// List active users matching a filter.
    ///
    /// # Errors
    /// * `INTERNAL` - Database operation failed
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, AppError>;

    /// Retrieve a user that has not been removed.
    ///
    /// # Arguments
    /// * `id` - User ID
    ///
    /// # Errors
    /// * `NOT_FOUND` - User does not exist or is in the trash
    /// * `INTERNAL` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, AppError>;

    /// Partially update a user.
    ///
    /// # Arguments
    /// * `id` - User ID to update
    /// * `command` - Fields to change
    ///
    /// # Returns
    /// Updated user entity
    ///
    /// # Errors
    /// * `NOT_FOUND` - User does not exist or is in the trash
    /// * `CONFLICT` - A changed unique field is taken by another user
    /// * `INTERNAL` - Database operation failed
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, AppError>;

    /// Move a user to the trash.
    ///
    /// # Errors
    /// * `NOT_FOUND` - User does not exist or is already in the trash
    async fn remove_user(&self, id: &UserId) -> Result<(), AppError>;

    /// Bring a user back from the trash.
    ///
    /// # Errors
    /// * `NOT_FOUND` - User is not in the trash
    async fn restore_user(&self, id: &UserId) -> Result<User, AppError>;

    /// List users in the trash matching a filter.
    async fn trashed_users(&self, filter: &UserFilter) -> Result<Vec<User>, AppError>;

    /// Permanently delete a user.
    ///
    /// # Errors
    /// * `NOT_FOUND` - User does not exist
    /// * `VALIDATION` - User has not been removed first
    async fn prune_user(&self, id: &UserId) -> Result<(), AppError>;
}

/// Persistence operations for user aggregate.
///
/// Implementations classify their own failures into `AppError` codes.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Returns
    /// Created user entity with storage-assigned timestamps
    ///
    /// # Errors
    /// * `CONFLICT` - A unique attribute is already in use
    /// * `INTERNAL` - Database operation failed
    async fn create(&self, user: User) -> Result<User, AppError>;

    /// Retrieve user by identifier, including users in the trash.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AppError>;

    /// Retrieve a non-deleted user by email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Retrieve non-deleted users matching a filter.
    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, AppError>;

    /// Apply a partial update.
    ///
    /// # Errors
    /// * `NOT_FOUND` - User does not exist or is in the trash
    /// * `CONFLICT` - A unique attribute is already in use
    async fn update(&self, id: &UserId, command: &UpdateUserCommand) -> Result<User, AppError>;

    /// Set `deleted_at` and force the status to `inactive`.
    ///
    /// # Errors
    /// * `NOT_FOUND` - User does not exist or is already in the trash
    async fn soft_delete(&self, id: &UserId) -> Result<(), AppError>;

    /// Clear `deleted_at` and set the status back to `active`.
    ///
    /// # Errors
    /// * `NOT_FOUND` - User is not in the trash
    async fn restore(&self, id: &UserId) -> Result<User, AppError>;

    /// Retrieve soft-deleted users matching a filter.
    async fn trash(&self, filter: &UserFilter) -> Result<Vec<User>, AppError>;

    /// Remove a user row permanently.
    ///
    /// # Errors
    /// * `NOT_FOUND` - User does not exist
    async fn prune(&self, id: &UserId) -> Result<(), AppError>;

    /// Report every unique attribute already held by another user.
    ///
    /// # Returns
    /// One field error per colliding attribute, empty when all are free
    async fn check_conflict(&self, fields: &UniqueFields) -> Result<Vec<FieldError>, AppError>;
}
