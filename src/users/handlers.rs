use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{SearchParams, UserSearchResponse};
use super::services::search_users_page;
use crate::{auth::AdminUser, error::ApiResult, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users/search", get(search))
}

#[instrument(skip(state, caller, params), fields(caller_id = %caller.0.id))]
pub async fn search(
    State(state): State<AppState>,
    caller: AdminUser,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<UserSearchResponse>> {
    let Query(params) = params?;
    let (filter, page) = params.into_parts();

    let result = search_users_page(state.users.as_ref(), &filter, page).await?;

    info!(returned = result.users.len(), total = result.total, "users searched");
    Ok(Json(UserSearchResponse::from(result)))
}
