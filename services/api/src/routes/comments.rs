//! Comment endpoints

use axum::{
    Extension, Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    middleware,
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, ensure_owner},
    middleware::{AuthUser, auth_middleware},
    models::{ContentRequest, PageQuery, comment::Comment},
    response::{ApiResponse, Paginated, normalize_page},
    state::AppState,
    validation::{parse_id, require_text},
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/:videoId", get(list_comments).post(add_comment))
        .route("/c/:commentId", patch(update_comment).delete(delete_comment))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn ensure_video_exists(state: &AppState, video_id: Uuid) -> ApiResult<()> {
    let exists = state
        .video_repository
        .exists(video_id)
        .await
        .map_err(|e| ApiError::internal("Failed to load video", e))?;

    if !exists {
        return Err(ApiError::NotFound("Video not found".to_string()));
    }
    Ok(())
}

async fn load_comment(state: &AppState, id: Uuid) -> ApiResult<Comment> {
    state
        .comment_repository
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::internal("Failed to load comment", e))?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))
}

/// Comments of a video, newest first
pub async fn list_comments(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<Paginated<Comment>>> {
    let video_id = parse_id(&video_id, "Video")?;
    let Query(query) = query?;
    let (page, limit) = normalize_page(query.page, query.limit);

    ensure_video_exists(&state, video_id).await?;

    let (comments, total) = state
        .comment_repository
        .list_by_video(video_id, page, limit)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch comments", e))?;

    Ok(ApiResponse::ok(
        Paginated::new(comments, page, limit, total),
        "Comments fetched successfully",
    ))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<Comment>> {
    let video_id = parse_id(&video_id, "Video")?;
    let Json(payload) = payload?;
    let content = require_text(payload.content.as_deref(), "content")?;

    ensure_video_exists(&state, video_id).await?;

    let comment = state
        .comment_repository
        .create(video_id, auth.id, &content)
        .await
        .map_err(|e| ApiError::internal("Failed to add comment", e))?;

    Ok(ApiResponse::created(comment, "Comment added successfully"))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(comment_id): Path<String>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<Comment>> {
    let comment_id = parse_id(&comment_id, "Comment")?;
    let Json(payload) = payload?;
    let content = require_text(payload.content.as_deref(), "content")?;

    let comment = load_comment(&state, comment_id).await?;
    ensure_owner(comment.owner_id, auth.id, "update this comment")?;

    let comment = state
        .comment_repository
        .update(comment_id, &content)
        .await
        .map_err(|e| ApiError::internal("Failed to update comment", e))?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    Ok(ApiResponse::ok(comment, "Comment updated successfully"))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(comment_id): Path<String>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let comment_id = parse_id(&comment_id, "Comment")?;
    let comment = load_comment(&state, comment_id).await?;
    ensure_owner(comment.owner_id, auth.id, "delete this comment")?;

    let deleted = state
        .comment_repository
        .delete(comment_id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete comment", e))?;
    if !deleted {
        return Err(ApiError::NotFound("Comment not found".to_string()));
    }

    Ok(ApiResponse::message("Comment deleted successfully"))
}
