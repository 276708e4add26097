//! Repositories for database operations

pub mod channel;
pub mod comment;
pub mod history;
pub mod like;
pub mod playlist;
pub mod subscription;
pub mod tweet;
pub mod user;
pub mod video;

pub use channel::ChannelRepository;
pub use comment::CommentRepository;
pub use history::HistoryRepository;
pub use like::LikeRepository;
pub use playlist::PlaylistRepository;
pub use subscription::SubscriptionRepository;
pub use tweet::TweetRepository;
pub use user::UserRepository;
pub use video::VideoRepository;
