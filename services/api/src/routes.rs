//! API service routes

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use crate::{response::ApiResponse, state::AppState};

pub mod comments;
pub mod dashboard;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/users", users::router(state.clone()))
        .nest("/videos", videos::router(state.clone()))
        .nest("/comments", comments::router(state.clone()))
        .nest("/likes", likes::router(state.clone()))
        .nest("/subscriptions", subscriptions::router(state.clone()))
        .nest("/playlists", playlists::router(state.clone()))
        .nest("/tweets", tweets::router(state.clone()))
        .nest("/dashboard", dashboard::router(state.clone()));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    let (status, label) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    ApiResponse::new(
        status,
        json!({
            "status": label,
            "service": "vidtube-api",
            "database": database,
        }),
        "Health check",
    )
}
