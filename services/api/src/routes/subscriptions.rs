//! Subscription toggle and listings

use axum::{
    Extension, Router,
    extract::{Path, State},
    middleware,
    routing::get,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
    models::subscription::{ChannelMember, SubscriptionKey},
    response::ApiResponse,
    state::AppState,
    validation::parse_id,
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/c/:channelId",
            get(channel_subscribers).post(toggle_subscription),
        )
        .route("/u/:subscriberId", get(subscribed_channels))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn ensure_user_exists(state: &AppState, id: Uuid, entity: &str) -> ApiResult<()> {
    let exists = state
        .user_repository
        .exists(id)
        .await
        .map_err(|e| ApiError::internal("Failed to load user", e))?;

    if !exists {
        return Err(ApiError::NotFound(format!("{} not found", entity)));
    }
    Ok(())
}

/// Subscribe to a channel, or unsubscribe when already subscribed
pub async fn toggle_subscription(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(channel_id): Path<String>,
) -> ApiResult<ApiResponse<Value>> {
    let channel_id = parse_id(&channel_id, "Channel")?;

    if channel_id == auth.id {
        return Err(ApiError::BadRequest(
            "Cannot subscribe to your own channel".to_string(),
        ));
    }
    ensure_user_exists(&state, channel_id, "Channel").await?;

    let key = SubscriptionKey {
        subscriber_id: auth.id,
        channel_id,
    };
    let outcome = state
        .toggles
        .toggle(&state.subscription_repository, &key)
        .await
        .map_err(|e| ApiError::internal("Failed to toggle subscription", e))?;

    Ok(ApiResponse::ok(
        json!({ "isSubscribed": outcome.is_present() }),
        format!("{} subscription", outcome.as_str()),
    ))
}

/// Users subscribed to a channel
pub async fn channel_subscribers(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<ChannelMember>>> {
    let channel_id = parse_id(&channel_id, "Channel")?;
    ensure_user_exists(&state, channel_id, "Channel").await?;

    let subscribers = state
        .subscription_repository
        .subscribers(channel_id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch subscribers", e))?;

    Ok(ApiResponse::ok(
        subscribers,
        "Subscribers fetched successfully",
    ))
}

/// Channels a user is subscribed to
pub async fn subscribed_channels(
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<ChannelMember>>> {
    let subscriber_id = parse_id(&subscriber_id, "Subscriber")?;
    ensure_user_exists(&state, subscriber_id, "Subscriber").await?;

    let channels = state
        .subscription_repository
        .subscribed_channels(subscriber_id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch subscribed channels", e))?;

    Ok(ApiResponse::ok(
        channels,
        "Subscribed channels fetched successfully",
    ))
}
