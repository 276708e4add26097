//! Like relation and liked-video projection

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The entity a like points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Video(Uuid),
    Comment(Uuid),
    Tweet(Uuid),
}

impl LikeTarget {
    pub fn id(&self) -> Uuid {
        match self {
            LikeTarget::Video(id) | LikeTarget::Comment(id) | LikeTarget::Tweet(id) => *id,
        }
    }

    /// Column of the `likes` table holding this target
    pub fn column(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "video_id",
            LikeTarget::Comment(_) => "comment_id",
            LikeTarget::Tweet(_) => "tweet_id",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "video",
            LikeTarget::Comment(_) => "comment",
            LikeTarget::Tweet(_) => "tweet",
        }
    }
}

/// Composite key of a like: (target, liker)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeKey {
    pub target: LikeTarget,
    pub liked_by: Uuid,
}

impl fmt::Display for LikeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "like:{}:{}:{}",
            self.target.kind(),
            self.target.id(),
            self.liked_by
        )
    }
}

/// A video the caller liked, with its total like count
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideo {
    pub video_id: Uuid,
    pub title: String,
    pub thumbnail: String,
    pub owner: Uuid,
    pub likes_count: i64,
    pub liked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_differ_per_target_kind() {
        let id = Uuid::new_v4();
        let user = Uuid::new_v4();
        let on_video = LikeKey {
            target: LikeTarget::Video(id),
            liked_by: user,
        };
        let on_tweet = LikeKey {
            target: LikeTarget::Tweet(id),
            liked_by: user,
        };

        assert_ne!(on_video.to_string(), on_tweet.to_string());
        assert_eq!(on_video.to_string(), format!("like:video:{}:{}", id, user));
        assert_eq!(LikeTarget::Comment(id).column(), "comment_id");
    }
}
