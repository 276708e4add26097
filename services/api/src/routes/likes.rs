//! Like toggles and liked-video listing

use axum::{
    Extension, Router,
    extract::{Path, State},
    middleware,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
    models::like::{LikeKey, LikeTarget, LikedVideo},
    response::ApiResponse,
    routes::videos::load_visible_video,
    state::AppState,
    validation::parse_id,
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/toggle/v/:videoId", post(toggle_video_like))
        .route("/toggle/c/:commentId", post(toggle_comment_like))
        .route("/toggle/t/:tweetId", post(toggle_tweet_like))
        .route("/videos", get(liked_videos))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// 404 unless the comment or tweet behind `target` exists
async fn require_target(state: &AppState, target: LikeTarget, entity: &str) -> ApiResult<()> {
    let exists = state
        .like_repository
        .target_exists(target)
        .await
        .map_err(|e| ApiError::internal("Failed to load like target", e))?;
    if !exists {
        return Err(ApiError::NotFound(format!("{} not found", entity)));
    }
    Ok(())
}

async fn toggle_like(
    state: &AppState,
    auth: &AuthUser,
    target: LikeTarget,
) -> ApiResult<ApiResponse<Value>> {
    let key = LikeKey {
        target,
        liked_by: auth.id,
    };
    let outcome = state
        .toggles
        .toggle(&state.like_repository, &key)
        .await
        .map_err(|e| ApiError::internal("Failed to toggle like", e))?;

    Ok(ApiResponse::ok(
        json!({ "isLiked": outcome.is_present() }),
        format!("{} like", outcome.as_str()),
    ))
}

/// Unpublished videos can only be liked by their owner
pub async fn toggle_video_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<Value>> {
    let video_id = parse_id(&video_id, "Video")?;
    load_visible_video(&state, video_id, auth.id).await?;
    toggle_like(&state, &auth, LikeTarget::Video(video_id)).await
}

pub async fn toggle_comment_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(comment_id): Path<String>,
) -> ApiResult<ApiResponse<Value>> {
    let target = LikeTarget::Comment(parse_id(&comment_id, "Comment")?);
    require_target(&state, target, "Comment").await?;
    toggle_like(&state, &auth, target).await
}

pub async fn toggle_tweet_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tweet_id): Path<String>,
) -> ApiResult<ApiResponse<Value>> {
    let target = LikeTarget::Tweet(parse_id(&tweet_id, "Tweet")?);
    require_target(&state, target, "Tweet").await?;
    toggle_like(&state, &auth, target).await
}

/// Videos the caller liked, each with its total like count
pub async fn liked_videos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<ApiResponse<Vec<LikedVideo>>> {
    let videos = state
        .like_repository
        .liked_videos(auth.id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch liked videos", e))?;

    Ok(ApiResponse::ok(videos, "Liked videos fetched successfully"))
}
