//! Account, session, channel profile and watch history endpoints

use axum::{
    Extension, Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, State, multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    middleware,
    routing::{get, patch, post},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use std::time::Duration;
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    jwt::{JwtService, TokenPair, revoked_token_key},
    middleware::{
        ACCESS_TOKEN_COOKIE, AuthUser, REFRESH_TOKEN_COOKIE, auth_middleware,
        optional_auth_middleware,
    },
    models::{
        channel::ChannelProfile,
        user::{
            ChangePasswordRequest, LoginRequest, LoginResponse, NewUser, PublicUser,
            RefreshTokenRequest, TokenResponse, UpdateAccountRequest, User,
        },
        video::{Video, WatchedVideo},
    },
    repositories::user::verify_password,
    response::ApiResponse,
    routes::videos::load_visible_video,
    state::AppState,
    storage::MediaKind,
    upload::UploadForm,
    validation::{normalize_email, normalize_username, parse_id, require_text, validate_password},
};

pub fn router(state: AppState) -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(state.server_config.max_upload_bytes);

    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/change-password", post(change_password))
        .route("/current-user", get(current_user))
        .route("/update-account", patch(update_account))
        .route("/avatar", patch(update_avatar).layer(upload_limit.clone()))
        .route("/cover-image", patch(update_cover_image).layer(upload_limit.clone()))
        .route("/history", get(watch_history))
        .route("/history/:videoId", patch(add_to_watch_history))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let profile = Router::new()
        .route("/c/:username", get(channel_profile))
        .route_layer(middleware::from_fn_with_state(
            state,
            optional_auth_middleware,
        ));

    Router::new()
        .route("/register", post(register).layer(upload_limit))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .merge(protected)
        .merge(profile)
}

fn token_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

fn set_token_cookies(jar: CookieJar, tokens: &TokenPair, secure: bool) -> CookieJar {
    jar.add(token_cookie(
        ACCESS_TOKEN_COOKIE,
        tokens.access_token.clone(),
        secure,
    ))
    .add(token_cookie(
        REFRESH_TOKEN_COOKIE,
        tokens.refresh_token.clone(),
        secure,
    ))
}

fn clear_token_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/"))
}

/// Issue a token pair and remember the refresh token on the user record
async fn issue_tokens(state: &AppState, user: &User) -> ApiResult<TokenPair> {
    let tokens = state
        .jwt_service
        .generate_pair(user)
        .map_err(|e| ApiError::internal("Failed to generate tokens", e))?;

    state
        .user_repository
        .set_refresh_token(user.id, Some(&tokens.refresh_token))
        .await
        .map_err(|e| ApiError::internal("Failed to store refresh token", e))?;

    Ok(tokens)
}

async fn load_user(state: &AppState, id: uuid::Uuid) -> ApiResult<User> {
    state
        .user_repository
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::internal("Failed to load user", e))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Register a user from a multipart form with avatar and optional cover image
pub async fn register(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ApiResponse<PublicUser>> {
    let mut form = UploadForm::collect(multipart?).await?;

    let full_name = require_text(form.field("fullName"), "fullName")?;
    let email = require_text(form.field("email"), "email")?;
    let username = require_text(form.field("username"), "username")?;
    let password = require_text(form.field("password"), "password")?;

    let username = normalize_username(&username)?;
    let email = normalize_email(&email)?;
    validate_password(&password)?;

    let taken = state
        .user_repository
        .is_taken(&username, &email)
        .await
        .map_err(|e| ApiError::internal("Failed to check existing users", e))?;
    if taken {
        return Err(ApiError::Conflict(
            "User with email or username already exists".to_string(),
        ));
    }

    let avatar = form.require_file("avatar", MediaKind::Avatar)?;
    let cover_image = form.take_file("coverImage", MediaKind::CoverImage)?;

    let avatar_url = state
        .storage
        .upload(MediaKind::Avatar, avatar)
        .await
        .map_err(|e| ApiError::internal("Failed to upload avatar", e))?;

    let cover_image_url = match cover_image {
        Some(file) => state
            .storage
            .upload(MediaKind::CoverImage, file)
            .await
            .map_err(|e| ApiError::internal("Failed to upload cover image", e))?,
        None => String::new(),
    };

    let new_user = NewUser {
        username,
        full_name,
        email,
        password,
        avatar_url,
        cover_image_url,
    };

    let user = state.user_repository.create(&new_user).await.map_err(|e| {
        if common::error::is_unique_violation(&e) {
            ApiError::Conflict("User with email or username already exists".to_string())
        } else {
            ApiError::internal("Something went wrong while registering the user", e)
        }
    })?;

    info!("Registered user {}", user.id);
    Ok(ApiResponse::created(
        PublicUser::from(user),
        "User registered successfully",
    ))
}

/// Log in with username or email, issuing tokens as cookies and in the body
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<(CookieJar, ApiResponse<LoginResponse>)> {
    let Json(payload) = payload?;

    let identifier = payload
        .identifier()
        .ok_or_else(|| ApiError::BadRequest("username or email is required".to_string()))?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("password is required".to_string()))?;

    let limiter_key = format!("login:{}", identifier);
    if !state.login_limiter.is_allowed(&limiter_key).await {
        warn!("Login attempts exhausted for {}", identifier);
        return Err(ApiError::TooManyRequests);
    }

    let user = state
        .user_repository
        .find_by_username_or_email(&identifier)
        .await
        .map_err(|e| ApiError::internal("Failed to load user", e))?
        .ok_or_else(|| ApiError::NotFound("User does not exist".to_string()))?;

    let valid = verify_password(&user, &password)
        .map_err(|e| ApiError::internal("Failed to verify credentials", e))?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid user credentials".to_string()));
    }

    state.login_limiter.reset(&limiter_key).await;

    let tokens = issue_tokens(&state, &user).await?;
    let jar = set_token_cookies(jar, &tokens, state.server_config.cookie_secure);

    info!("User {} logged in", user.id);
    Ok((
        jar,
        ApiResponse::ok(
            LoginResponse {
                user: PublicUser::from(user),
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            },
            "User logged in successfully",
        ),
    ))
}

/// Drop the stored refresh token and revoke the presented access token
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, ApiResponse<serde_json::Value>)> {
    state
        .user_repository
        .set_refresh_token(user.id, None)
        .await
        .map_err(|e| ApiError::internal("Failed to clear refresh token", e))?;

    let ttl = state
        .jwt_service
        .validate_access_token(&user.token)
        .map(|claims| JwtService::remaining_lifetime(&claims))
        .unwrap_or_else(|_| state.jwt_service.access_token_expiry());

    state
        .redis_pool
        .mark(&revoked_token_key(&user.token), Duration::from_secs(ttl.max(1)))
        .await
        .map_err(|e| ApiError::internal("Failed to revoke access token", e))?;

    info!("User {} logged out", user.id);
    Ok((
        clear_token_cookies(jar),
        ApiResponse::message("User logged out"),
    ))
}

/// Rotate the token pair; the presented refresh token must be the stored one
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshTokenRequest>>,
) -> ApiResult<(CookieJar, ApiResponse<TokenResponse>)> {
    let incoming = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| body.and_then(|Json(body)| body.refresh_token))
        .ok_or_else(ApiError::unauthorized)?;

    let claims = state
        .jwt_service
        .validate_refresh_token(&incoming)
        .map_err(|_| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(|e| ApiError::internal("Failed to load user", e))?
        .ok_or_else(|| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

    if user.refresh_token.as_deref() != Some(incoming.as_str()) {
        return Err(ApiError::Unauthorized(
            "Refresh token is expired or used".to_string(),
        ));
    }

    let tokens = issue_tokens(&state, &user).await?;
    let jar = set_token_cookies(jar, &tokens, state.server_config.cookie_secure);

    Ok((
        jar,
        ApiResponse::ok(
            TokenResponse {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            },
            "Access token refreshed",
        ),
    ))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let Json(payload) = payload?;

    let old_password = payload
        .old_password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("oldPassword is required".to_string()))?;
    let new_password = payload
        .new_password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("newPassword is required".to_string()))?;
    validate_password(&new_password)?;

    let user = load_user(&state, auth.id).await?;
    let valid = verify_password(&user, &old_password)
        .map_err(|e| ApiError::internal("Failed to verify credentials", e))?;
    if !valid {
        return Err(ApiError::BadRequest("Invalid old password".to_string()));
    }

    state
        .user_repository
        .update_password(user.id, &new_password)
        .await
        .map_err(|e| ApiError::internal("Failed to change password", e))?;

    Ok(ApiResponse::message("Password changed successfully"))
}

pub async fn current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<ApiResponse<PublicUser>> {
    let user = load_user(&state, auth.id).await?;
    Ok(ApiResponse::ok(
        PublicUser::from(user),
        "Current user fetched successfully",
    ))
}

pub async fn update_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<PublicUser>> {
    let Json(payload) = payload?;

    let full_name = require_text(payload.full_name.as_deref(), "fullName")?;
    let email = normalize_email(&require_text(payload.email.as_deref(), "email")?)?;

    let user = state
        .user_repository
        .update_account(auth.id, &full_name, &email)
        .await
        .map_err(|e| {
            if common::error::is_unique_violation(&e) {
                ApiError::Conflict("Email is already in use".to_string())
            } else {
                ApiError::internal("Failed to update account details", e)
            }
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok(
        PublicUser::from(user),
        "Account details updated successfully",
    ))
}

pub async fn update_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ApiResponse<PublicUser>> {
    let mut form = UploadForm::collect(multipart?).await?;
    let avatar = form.require_file("avatar", MediaKind::Avatar)?;

    let url = state
        .storage
        .upload(MediaKind::Avatar, avatar)
        .await
        .map_err(|e| ApiError::internal("Failed to upload avatar", e))?;

    let user = state
        .user_repository
        .update_avatar(auth.id, &url)
        .await
        .map_err(|e| ApiError::internal("Failed to update avatar", e))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok(
        PublicUser::from(user),
        "Avatar image updated successfully",
    ))
}

pub async fn update_cover_image(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ApiResponse<PublicUser>> {
    let mut form = UploadForm::collect(multipart?).await?;
    let cover_image = form.require_file("coverImage", MediaKind::CoverImage)?;

    let url = state
        .storage
        .upload(MediaKind::CoverImage, cover_image)
        .await
        .map_err(|e| ApiError::internal("Failed to upload cover image", e))?;

    let user = state
        .user_repository
        .update_cover_image(auth.id, &url)
        .await
        .map_err(|e| ApiError::internal("Failed to update cover image", e))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok(
        PublicUser::from(user),
        "Cover image updated successfully",
    ))
}

/// Public channel profile; `isSubscribed` reflects the caller when logged in
pub async fn channel_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    auth: Option<Extension<AuthUser>>,
) -> ApiResult<ApiResponse<ChannelProfile>> {
    let username = require_text(Some(&username), "username")?;
    let requester = auth.map(|Extension(user)| user.id);

    let profile = state
        .channel_repository
        .profile(&username, requester)
        .await
        .map_err(|e| ApiError::internal("Failed to load channel", e))?
        .ok_or_else(|| ApiError::NotFound("Channel does not exist".to_string()))?;

    Ok(ApiResponse::ok(profile, "User channel fetched successfully"))
}

pub async fn watch_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<ApiResponse<Vec<WatchedVideo>>> {
    let history = state
        .history_repository
        .watch_history(auth.id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch watch history", e))?;

    Ok(ApiResponse::ok(history, "Watch history fetched successfully"))
}

/// Record that the caller watched a video
pub async fn add_to_watch_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<Video>> {
    let video_id = parse_id(&video_id, "Video")?;

    load_visible_video(&state, video_id, auth.id).await?;

    let video = state
        .history_repository
        .record_view(video_id, auth.id)
        .await
        .map_err(|e| ApiError::internal("Something went wrong while updating watch history", e))?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

    Ok(ApiResponse::ok(video, "Watch history updated successfully"))
}
