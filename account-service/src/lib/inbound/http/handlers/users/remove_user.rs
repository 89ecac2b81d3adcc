use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use crate::domain::errors::AppError;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::MessageData;
use crate::inbound::http::router::AppState;

/// Move a user to the trash. The row is kept until pruned.
pub async fn remove_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(AppError::from)?;

    state
        .user_service
        .remove_user(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("user moved to trash")))
}
