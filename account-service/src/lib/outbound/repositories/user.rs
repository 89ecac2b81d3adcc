use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::domain::errors::AppError;
use crate::domain::errors::FieldError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PhoneNumber;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserRole;
use crate::domain::user::models::UserStatus;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UniqueFields;
use crate::domain::user::ports::UserRepository;
use crate::outbound::repositories::errors::map_sqlx_error;

const USER_COLUMNS: &str =
    "id, username, email, phone, password_hash, status, role, created_at, updated_at, deleted_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    phone: String,
    password_hash: String,
    status: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let corrupt = |e: String| AppError::internal("stored user is invalid").with_source(e);

        Ok(User {
            id: UserId(row.id),
            username: Username::new(row.username).map_err(|e| corrupt(e.to_string()))?,
            email: EmailAddress::new(row.email).map_err(|e| corrupt(e.to_string()))?,
            phone: PhoneNumber::new(row.phone).map_err(|e| corrupt(e.to_string()))?,
            password_hash: row.password_hash,
            status: row
                .status
                .parse::<UserStatus>()
                .map_err(|e| corrupt(e.to_string()))?,
            role: row
                .role
                .parse::<UserRole>()
                .map_err(|e| corrupt(e.to_string()))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

fn into_users(rows: Vec<UserRow>) -> Result<Vec<User>, AppError> {
    rows.into_iter().map(User::try_from).collect()
}

/// Append equality conditions for every set filter field.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    if let Some(username) = &filter.username {
        builder.push(" AND username = ").push_bind(username.clone());
    }
    if let Some(email) = &filter.email {
        builder.push(" AND email = ").push_bind(email.clone());
    }
    if let Some(phone) = &filter.phone {
        builder.push(" AND phone = ").push_bind(phone.clone());
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(role) = filter.role {
        builder.push(" AND role = ").push_bind(role.as_str());
    }
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn select(&self, filter: &UserFilter, deleted: bool) -> Result<Vec<User>, AppError> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM users", USER_COLUMNS));
        builder.push(if deleted {
            " WHERE deleted_at IS NOT NULL"
        } else {
            " WHERE deleted_at IS NULL"
        });
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC");

        let rows = builder
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        into_users(rows)
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, username, email, phone, password_hash, status, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.phone.as_str())
        .bind(&user.password_hash)
        .bind(user.status.as_str())
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        User::try_from(row)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(User::try_from).transpose()
    }

    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, AppError> {
        self.select(filter, false).await
    }

    async fn update(&self, id: &UserId, command: &UpdateUserCommand) -> Result<User, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = now()");
        if let Some(username) = &command.username {
            builder
                .push(", username = ")
                .push_bind(username.as_str().to_string());
        }
        if let Some(email) = &command.email {
            builder.push(", email = ").push_bind(email.as_str().to_string());
        }
        if let Some(phone) = &command.phone {
            builder.push(", phone = ").push_bind(phone.as_str().to_string());
        }
        if let Some(status) = command.status {
            builder.push(", status = ").push_bind(status.as_str());
        }
        builder
            .push(" WHERE id = ")
            .push_bind(id.0)
            .push(" AND deleted_at IS NULL RETURNING ")
            .push(USER_COLUMNS);

        let row = builder
            .build_query_as::<UserRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        User::try_from(row)
    }

    async fn soft_delete(&self, id: &UserId) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = now(), status = 'inactive', updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("user not found"));
        }

        Ok(())
    }

    async fn restore(&self, id: &UserId) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET deleted_at = NULL, status = 'active', updated_at = now()
            WHERE id = $1 AND deleted_at IS NOT NULL
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| AppError::not_found("user not found in trash"))?;

        User::try_from(row)
    }

    async fn trash(&self, filter: &UserFilter) -> Result<Vec<User>, AppError> {
        self.select(filter, true).await
    }

    async fn prune(&self, id: &UserId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("user not found"));
        }

        Ok(())
    }

    async fn check_conflict(&self, fields: &UniqueFields) -> Result<Vec<FieldError>, AppError> {
        let username = fields.username.as_ref().map(|u| u.as_str().to_string());
        let email = fields.email.as_ref().map(|e| e.as_str().to_string());
        let phone = fields.phone.as_ref().map(|p| p.as_str().to_string());
        let exclude = fields.exclude.map(|id| id.0);

        let (username_taken, email_taken, phone_taken): (bool, bool, bool) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(bool_or(username = $1), false),
                COALESCE(bool_or(email = $2), false),
                COALESCE(bool_or(phone = $3), false)
            FROM users
            WHERE (username = $1 OR email = $2 OR phone = $3)
              AND ($4::uuid IS NULL OR id <> $4)
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(phone)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let conflicts = [
            ("username", username_taken),
            ("email", email_taken),
            ("phone", phone_taken),
        ]
        .into_iter()
        .filter(|(_, taken)| *taken)
        .map(|(field, _)| FieldError::taken(field))
        .collect();

        Ok(conflicts)
    }
}
