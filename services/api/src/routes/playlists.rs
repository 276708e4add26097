//! Playlist endpoints

use axum::{
    Extension, Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    middleware,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, ensure_owner},
    middleware::{AuthUser, auth_middleware},
    models::playlist::{Playlist, PlaylistRequest},
    response::ApiResponse,
    state::AppState,
    validation::{parse_id, require_text},
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_playlist))
        .route("/user/:userId", get(user_playlists))
        .route(
            "/:playlistId",
            get(get_playlist)
                .patch(update_playlist)
                .delete(delete_playlist),
        )
        .route("/add/:videoId/:playlistId", patch(add_video))
        .route("/remove/:videoId/:playlistId", patch(remove_video))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn load_playlist(state: &AppState, id: Uuid) -> ApiResult<Playlist> {
    state
        .playlist_repository
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::internal("Failed to load playlist", e))?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".to_string()))
}

fn playlist_fields(payload: &PlaylistRequest) -> ApiResult<(String, String)> {
    let name = require_text(payload.name.as_deref(), "name")?;
    let description = require_text(payload.description.as_deref(), "description")?;
    Ok((name, description))
}

/// Create a playlist, returning the existing one for an identical
/// (name, description, owner)
pub async fn create_playlist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<PlaylistRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<Playlist>> {
    let Json(payload) = payload?;
    let (name, description) = playlist_fields(&payload)?;

    let (playlist, created) = state
        .playlist_repository
        .create_or_get(auth.id, &name, &description)
        .await
        .map_err(|e| ApiError::internal("Failed to create playlist", e))?;

    if created {
        Ok(ApiResponse::created(playlist, "Playlist created successfully"))
    } else {
        Ok(ApiResponse::new(
            StatusCode::OK,
            playlist,
            "Playlist already exists",
        ))
    }
}

pub async fn user_playlists(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<Playlist>>> {
    let user_id = parse_id(&user_id, "User")?;

    let exists = state
        .user_repository
        .exists(user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to load user", e))?;
    if !exists {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let playlists = state
        .playlist_repository
        .list_by_owner(user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch playlists", e))?;

    Ok(ApiResponse::ok(playlists, "Playlists fetched successfully"))
}

pub async fn get_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> ApiResult<ApiResponse<Playlist>> {
    let playlist_id = parse_id(&playlist_id, "Playlist")?;
    let playlist = load_playlist(&state, playlist_id).await?;
    Ok(ApiResponse::ok(playlist, "Playlist fetched successfully"))
}

pub async fn update_playlist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(playlist_id): Path<String>,
    payload: Result<Json<PlaylistRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<Playlist>> {
    let playlist_id = parse_id(&playlist_id, "Playlist")?;
    let Json(payload) = payload?;
    let (name, description) = playlist_fields(&payload)?;

    let playlist = load_playlist(&state, playlist_id).await?;
    ensure_owner(playlist.owner_id, auth.id, "update this playlist")?;

    let playlist = state
        .playlist_repository
        .update(playlist_id, &name, &description)
        .await
        .map_err(|e| {
            if common::error::is_unique_violation(&e) {
                ApiError::Conflict(
                    "A playlist with this name and description already exists".to_string(),
                )
            } else {
                ApiError::internal("Failed to update playlist", e)
            }
        })?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".to_string()))?;

    Ok(ApiResponse::ok(playlist, "Playlist updated successfully"))
}

pub async fn delete_playlist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(playlist_id): Path<String>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let playlist_id = parse_id(&playlist_id, "Playlist")?;
    let playlist = load_playlist(&state, playlist_id).await?;
    ensure_owner(playlist.owner_id, auth.id, "delete this playlist")?;

    let deleted = state
        .playlist_repository
        .delete(playlist_id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete playlist", e))?;
    if !deleted {
        return Err(ApiError::NotFound("Playlist not found".to_string()));
    }

    Ok(ApiResponse::message("Playlist deleted successfully"))
}

/// Resolve `(videoId, playlistId)` and check the caller owns the playlist
async fn membership_target(
    state: &AppState,
    auth: &AuthUser,
    ids: (String, String),
    action: &str,
) -> ApiResult<(Uuid, Uuid)> {
    let video_id = parse_id(&ids.0, "Video")?;
    let playlist_id = parse_id(&ids.1, "Playlist")?;

    let playlist = load_playlist(state, playlist_id).await?;
    ensure_owner(playlist.owner_id, auth.id, action)?;

    let exists = state
        .video_repository
        .exists(video_id)
        .await
        .map_err(|e| ApiError::internal("Failed to load video", e))?;
    if !exists {
        return Err(ApiError::NotFound("Video not found".to_string()));
    }

    Ok((video_id, playlist_id))
}

pub async fn add_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<ApiResponse<Playlist>> {
    let Path(ids) = ids?;
    let (video_id, playlist_id) =
        membership_target(&state, &auth, ids, "add videos to this playlist").await?;

    state
        .playlist_repository
        .add_video(playlist_id, video_id)
        .await
        .map_err(|e| ApiError::internal("Failed to add video to playlist", e))?;

    let playlist = load_playlist(&state, playlist_id).await?;
    Ok(ApiResponse::ok(
        playlist,
        "Video added to playlist successfully",
    ))
}

pub async fn remove_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<ApiResponse<Playlist>> {
    let Path(ids) = ids?;
    let (video_id, playlist_id) =
        membership_target(&state, &auth, ids, "remove videos from this playlist").await?;

    state
        .playlist_repository
        .remove_video(playlist_id, video_id)
        .await
        .map_err(|e| ApiError::internal("Failed to remove video from playlist", e))?;

    let playlist = load_playlist(&state, playlist_id).await?;
    Ok(ApiResponse::ok(
        playlist,
        "Video removed from playlist successfully",
    ))
}
