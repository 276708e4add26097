//! Tweet endpoints

use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    middleware,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, ensure_owner},
    middleware::{AuthUser, auth_middleware},
    models::{ContentRequest, tweet::Tweet},
    response::ApiResponse,
    state::AppState,
    validation::{parse_id, require_text},
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_tweet))
        .route("/user/:userId", get(user_tweets))
        .route("/:tweetId", patch(update_tweet).delete(delete_tweet))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn load_tweet(state: &AppState, id: Uuid) -> ApiResult<Tweet> {
    state
        .tweet_repository
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::internal("Failed to load tweet", e))?
        .ok_or_else(|| ApiError::NotFound("Tweet not found".to_string()))
}

pub async fn create_tweet(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<Tweet>> {
    let Json(payload) = payload?;
    let content = require_text(payload.content.as_deref(), "content")?;

    let tweet = state
        .tweet_repository
        .create(auth.id, &content)
        .await
        .map_err(|e| ApiError::internal("Failed to create tweet", e))?;

    Ok(ApiResponse::created(tweet, "Tweet created successfully"))
}

pub async fn user_tweets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<Tweet>>> {
    let user_id = parse_id(&user_id, "User")?;

    let exists = state
        .user_repository
        .exists(user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to load user", e))?;
    if !exists {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let tweets = state
        .tweet_repository
        .list_by_owner(user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch tweets", e))?;

    Ok(ApiResponse::ok(tweets, "Tweets fetched successfully"))
}

pub async fn update_tweet(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tweet_id): Path<String>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<Tweet>> {
    let tweet_id = parse_id(&tweet_id, "Tweet")?;
    let Json(payload) = payload?;
    let content = require_text(payload.content.as_deref(), "content")?;

    let tweet = load_tweet(&state, tweet_id).await?;
    ensure_owner(tweet.owner_id, auth.id, "update this tweet")?;

    let tweet = state
        .tweet_repository
        .update(tweet_id, &content)
        .await
        .map_err(|e| ApiError::internal("Failed to update tweet", e))?
        .ok_or_else(|| ApiError::NotFound("Tweet not found".to_string()))?;

    Ok(ApiResponse::ok(tweet, "Tweet updated successfully"))
}

pub async fn delete_tweet(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tweet_id): Path<String>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let tweet_id = parse_id(&tweet_id, "Tweet")?;
    let tweet = load_tweet(&state, tweet_id).await?;
    ensure_owner(tweet.owner_id, auth.id, "delete this tweet")?;

    let deleted = state
        .tweet_repository
        .delete(tweet_id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete tweet", e))?;
    if !deleted {
        return Err(ApiError::NotFound("Tweet not found".to_string()));
    }

    Ok(ApiResponse::message("Tweet deleted successfully"))
}
