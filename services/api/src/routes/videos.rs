//! Video endpoints

use axum::{
    Extension, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, Query, State, multipart::MultipartRejection,
        rejection::QueryRejection,
    },
    middleware,
    routing::{get, patch},
};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, ensure_owner},
    middleware::{AuthUser, auth_middleware},
    models::video::{NewVideo, Video, VideoFilter, VideoQuery, VideoSort, VideoUpdate},
    response::{ApiResponse, Paginated, normalize_page},
    state::AppState,
    storage::MediaKind,
    upload::UploadForm,
    validation::{parse_id, require_text},
};

pub fn router(state: AppState) -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(state.server_config.max_upload_bytes);

    Router::new()
        .route(
            "/",
            get(list_videos).post(publish_video).layer(upload_limit.clone()),
        )
        .route(
            "/:videoId",
            get(get_video)
                .patch(update_video)
                .delete(delete_video)
                .layer(upload_limit),
        )
        .route("/toggle/publish/:videoId", patch(toggle_publish))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Turn raw query parameters into a validated filter for `requester`
pub fn build_filter(query: VideoQuery, requester: Uuid) -> ApiResult<VideoFilter> {
    let (page, limit) = normalize_page(query.page, query.limit);

    let sort = VideoSort::parse(query.sort_by.as_deref()).ok_or_else(|| {
        ApiError::BadRequest("sortBy must be one of createdAt, views, duration, title".to_string())
    })?;

    let descending = match query.sort_type.as_deref().map(str::to_lowercase).as_deref() {
        None | Some("desc") => true,
        Some("asc") => false,
        Some(_) => {
            return Err(ApiError::BadRequest(
                "sortType must be asc or desc".to_string(),
            ));
        }
    };

    let search = query
        .query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());

    Ok(VideoFilter {
        page,
        limit,
        search,
        sort,
        descending,
        include_unpublished: query.user_id == Some(requester),
        owner_id: query.user_id,
    })
}

/// Load a video `viewer` may see; hidden videos are reported as missing
pub(crate) async fn load_visible_video(
    state: &AppState,
    id: Uuid,
    viewer: Uuid,
) -> ApiResult<Video> {
    let video = load_video(state, id).await?;
    if !video.is_visible_to(viewer) {
        return Err(ApiError::NotFound("Video not found".to_string()));
    }
    Ok(video)
}

/// Load a video or fail with 404
async fn load_video(state: &AppState, id: Uuid) -> ApiResult<Video> {
    state
        .video_repository
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::internal("Failed to load video", e))?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))
}

pub async fn list_videos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    query: Result<Query<VideoQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<Paginated<Video>>> {
    let Query(query) = query?;
    let filter = build_filter(query, auth.id)?;

    let (videos, total) = state
        .video_repository
        .list(&filter)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch videos", e))?;

    Ok(ApiResponse::ok(
        Paginated::new(videos, filter.page, filter.limit, total),
        "Videos fetched successfully",
    ))
}

/// Publish a video from a multipart form (videoFile, thumbnail, title, description)
pub async fn publish_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ApiResponse<Video>> {
    let mut form = UploadForm::collect(multipart?).await?;

    let title = require_text(form.field("title"), "title")?;
    let description = require_text(form.field("description"), "description")?;
    let duration = parse_duration(form.field("duration"))?;

    let video_file = form.require_file("videoFile", MediaKind::Video)?;
    let thumbnail = form.require_file("thumbnail", MediaKind::Thumbnail)?;

    let video_url = state
        .storage
        .upload(MediaKind::Video, video_file)
        .await
        .map_err(|e| ApiError::internal("Failed to upload video", e))?;
    let thumbnail_url = state
        .storage
        .upload(MediaKind::Thumbnail, thumbnail)
        .await
        .map_err(|e| ApiError::internal("Failed to upload thumbnail", e))?;

    let video = state
        .video_repository
        .create(&NewVideo {
            owner_id: auth.id,
            title,
            description,
            video_url,
            thumbnail_url,
            duration,
        })
        .await
        .map_err(|e| ApiError::internal("Failed to publish video", e))?;

    Ok(ApiResponse::created(video, "Video published successfully"))
}

/// Duration in seconds from a form field; absent means unknown (0)
pub fn parse_duration(raw: Option<&str>) -> ApiResult<f64> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(0.0);
    };

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(ApiError::BadRequest(
            "duration must be a non-negative number".to_string(),
        )),
    }
}

/// Fetch a video; unpublished videos are only visible to their owner
pub async fn get_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<Video>> {
    let video_id = parse_id(&video_id, "Video")?;
    let video = load_visible_video(&state, video_id, auth.id).await?;
    Ok(ApiResponse::ok(video, "Video fetched successfully"))
}

/// Update title and description, and optionally replace the thumbnail
pub async fn update_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ApiResponse<Video>> {
    let video_id = parse_id(&video_id, "Video")?;
    let video = load_video(&state, video_id).await?;
    ensure_owner(video.owner_id, auth.id, "update this video")?;

    let mut form = UploadForm::collect(multipart?).await?;
    let title = require_text(form.field("title"), "title")?;
    let description = require_text(form.field("description"), "description")?;

    let thumbnail_url = match form.take_file("thumbnail", MediaKind::Thumbnail)? {
        Some(file) => Some(
            state
                .storage
                .upload(MediaKind::Thumbnail, file)
                .await
                .map_err(|e| ApiError::internal("Failed to upload thumbnail", e))?,
        ),
        None => None,
    };

    let video = state
        .video_repository
        .update(
            video_id,
            &VideoUpdate {
                title,
                description,
                thumbnail_url,
            },
        )
        .await
        .map_err(|e| ApiError::internal("Failed to update video", e))?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

    Ok(ApiResponse::ok(video, "Video updated successfully"))
}

pub async fn delete_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let video_id = parse_id(&video_id, "Video")?;
    let video = load_video(&state, video_id).await?;
    ensure_owner(video.owner_id, auth.id, "delete this video")?;

    let deleted = state
        .video_repository
        .delete(video_id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete video", e))?;
    if !deleted {
        return Err(ApiError::NotFound("Video not found".to_string()));
    }

    info!("Video {} deleted by {}", video_id, auth.id);
    Ok(ApiResponse::message("Video deleted successfully"))
}

pub async fn toggle_publish(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<Video>> {
    let video_id = parse_id(&video_id, "Video")?;
    let video = load_video(&state, video_id).await?;
    ensure_owner(video.owner_id, auth.id, "change the publish status of this video")?;

    let video = state
        .video_repository
        .toggle_publish(video_id)
        .await
        .map_err(|e| ApiError::internal("Failed to toggle publish status", e))?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

    Ok(ApiResponse::ok(
        video,
        "Video publish status toggled successfully",
    ))
}
