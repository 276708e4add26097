//! Application state shared across handlers

use common::cache::RedisPool;
use sqlx::PgPool;

use crate::{
    config::ServerConfig,
    jwt::JwtService,
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::{
        ChannelRepository, CommentRepository, HistoryRepository, LikeRepository,
        PlaylistRepository, SubscriptionRepository, TweetRepository, UserRepository,
        VideoRepository,
    },
    storage::MediaStorage,
    toggle::ToggleResolver,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub redis_pool: RedisPool,
    pub jwt_service: JwtService,
    pub storage: MediaStorage,
    pub server_config: ServerConfig,
    pub login_limiter: RateLimiter,
    pub toggles: ToggleResolver,
    pub user_repository: UserRepository,
    pub video_repository: VideoRepository,
    pub comment_repository: CommentRepository,
    pub like_repository: LikeRepository,
    pub subscription_repository: SubscriptionRepository,
    pub playlist_repository: PlaylistRepository,
    pub tweet_repository: TweetRepository,
    pub channel_repository: ChannelRepository,
    pub history_repository: HistoryRepository,
}

impl AppState {
    /// Wire every repository onto the same pool
    pub fn new(
        db_pool: PgPool,
        redis_pool: RedisPool,
        jwt_service: JwtService,
        storage: MediaStorage,
        server_config: ServerConfig,
    ) -> Self {
        Self {
            user_repository: UserRepository::new(db_pool.clone()),
            video_repository: VideoRepository::new(db_pool.clone()),
            comment_repository: CommentRepository::new(db_pool.clone()),
            like_repository: LikeRepository::new(db_pool.clone()),
            subscription_repository: SubscriptionRepository::new(db_pool.clone()),
            playlist_repository: PlaylistRepository::new(db_pool.clone()),
            tweet_repository: TweetRepository::new(db_pool.clone()),
            channel_repository: ChannelRepository::new(db_pool.clone()),
            history_repository: HistoryRepository::new(db_pool.clone()),
            login_limiter: RateLimiter::new(RateLimiterConfig::default()),
            toggles: ToggleResolver::new(),
            db_pool,
            redis_pool,
            jwt_service,
            storage,
            server_config,
        }
    }
}
