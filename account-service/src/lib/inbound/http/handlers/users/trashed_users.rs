use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;

use crate::domain::user::models::UserFilter;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::UserFilterQuery;
use crate::inbound::http::handlers::UserResponseData;
use crate::inbound::http::router::AppState;

pub async fn trashed_users(
    State(state): State<AppState>,
    Query(query): Query<UserFilterQuery>,
) -> Result<ApiSuccess<Vec<UserResponseData>>, ApiError> {
    let filter = UserFilter::try_from(query)?;

    let users = state.user_service.trashed_users(&filter).await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        users.iter().map(UserResponseData::from).collect(),
    ))
}
