//! Channel aggregations: per-video statistics, totals and public profile

use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::channel::{ChannelProfile, ChannelTotals, ChannelVideoStats};

/// Read-only aggregations over users, videos, likes and subscriptions
#[derive(Clone)]
pub struct ChannelRepository {
    pool: PgPool,
}

impl ChannelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One record per video owned by `owner_id`, with its like count and the
    /// channel's subscriber count. Empty when the owner has no videos.
    pub async fn channel_stats(&self, owner_id: Uuid) -> Result<Vec<ChannelVideoStats>> {
        let rows = sqlx::query(
            r#"
            SELECT v.id, v.title, v.views, v.owner_id,
                   (SELECT COUNT(*) FROM likes l WHERE l.video_id = v.id) AS likes_count,
                   (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = v.owner_id)
                       AS subscribers_count
            FROM videos v
            WHERE v.owner_id = $1
            ORDER BY v.created_at DESC, v.id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let stats = rows
            .into_iter()
            .map(|row| ChannelVideoStats {
                video_id: row.get("id"),
                title: row.get("title"),
                views: row.get("views"),
                likes_count: row.get("likes_count"),
                subscribers_count: row.get("subscribers_count"),
                owner: row.get("owner_id"),
            })
            .collect();

        Ok(stats)
    }

    pub async fn channel_totals(&self, owner_id: Uuid) -> Result<ChannelTotals> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM videos WHERE owner_id = $1) AS total_videos,
                (SELECT COALESCE(SUM(views), 0)::BIGINT FROM videos WHERE owner_id = $1)
                    AS total_views,
                (SELECT COUNT(*) FROM likes l JOIN videos v ON v.id = l.video_id
                    WHERE v.owner_id = $1) AS total_likes,
                (SELECT COUNT(*) FROM subscriptions WHERE channel_id = $1) AS total_subscribers
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ChannelTotals {
            total_videos: row.get("total_videos"),
            total_views: row.get("total_views"),
            total_likes: row.get("total_likes"),
            total_subscribers: row.get("total_subscribers"),
        })
    }

    /// Public profile of the channel named `username` (case-insensitive).
    /// `is_subscribed` is false for anonymous requesters.
    pub async fn profile(
        &self,
        username: &str,
        requester: Option<Uuid>,
    ) -> Result<Option<ChannelProfile>> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.username, u.full_name, u.email, u.avatar_url, u.cover_image_url,
                   (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = u.id)
                       AS subscribers_count,
                   (SELECT COUNT(*) FROM subscriptions s WHERE s.subscriber_id = u.id)
                       AS channels_subscribed_to_count,
                   EXISTS (
                       SELECT 1 FROM subscriptions s
                       WHERE s.channel_id = u.id AND s.subscriber_id = $2
                   ) AS is_subscribed
            FROM users u
            WHERE LOWER(u.username) = LOWER($1)
            "#,
        )
        .bind(username)
        .bind(requester)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ChannelProfile {
            id: row.get("id"),
            username: row.get("username"),
            full_name: row.get("full_name"),
            email: row.get("email"),
            avatar: row.get("avatar_url"),
            cover_image: row.get("cover_image_url"),
            subscribers_count: row.get("subscribers_count"),
            channels_subscribed_to_count: row.get("channels_subscribed_to_count"),
            is_subscribed: row.get("is_subscribed"),
        }))
    }
}
