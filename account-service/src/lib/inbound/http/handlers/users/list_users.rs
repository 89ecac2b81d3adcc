use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;

use crate::domain::user::models::UserFilter;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::UserFilterQuery;
use crate::inbound::http::handlers::UserResponseData;
use crate::inbound::http::router::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserFilterQuery>,
) -> Result<ApiSuccess<Vec<UserResponseData>>, ApiError> {
    let filter = UserFilter::try_from(query)?;

    state
        .user_service
        .list_users(&filter)
        .await
        .map_err(ApiError::from)
        .map(|users| {
            ApiSuccess::new(
                StatusCode::OK,
                users.iter().map(UserResponseData::from).collect(),
            )
        })
}
