//! Channel dashboard for the authenticated owner

use axum::{
    Extension, Router,
    extract::State,
    middleware,
    routing::get,
};

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
    models::{channel::ChannelDashboard, video::Video},
    response::ApiResponse,
    state::AppState,
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(channel_stats))
        .route("/videos", get(channel_videos))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Channel totals plus per-video views, likes and subscriber count
pub async fn channel_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<ApiResponse<ChannelDashboard>> {
    let videos = state
        .channel_repository
        .channel_stats(auth.id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch channel stats", e))?;

    let totals = state
        .channel_repository
        .channel_totals(auth.id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch channel stats", e))?;

    Ok(ApiResponse::ok(
        ChannelDashboard { totals, videos },
        "Channel stats fetched successfully",
    ))
}

/// Every video of the caller's channel, published or not
pub async fn channel_videos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<ApiResponse<Vec<Video>>> {
    let videos = state
        .video_repository
        .list_by_owner(auth.id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch channel videos", e))?;

    Ok(ApiResponse::ok(videos, "Channel videos fetched successfully"))
}
