//! Like repository: toggle storage and liked-video projection

use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::like::{LikeKey, LikeTarget, LikedVideo};
use crate::toggle::ToggleRelation;

/// Like repository
#[derive(Clone)]
pub struct LikeRepository {
    pool: PgPool,
}

impl LikeRepository {
    /// Create a new like repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether the liked entity exists
    pub async fn target_exists(&self, target: LikeTarget) -> Result<bool> {
        let table = match target {
            LikeTarget::Video(_) => "videos",
            LikeTarget::Comment(_) => "comments",
            LikeTarget::Tweet(_) => "tweets",
        };

        let exists: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1)"
        ))
        .bind(target.id())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn count(&self, target: LikeTarget) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM likes WHERE {} = $1",
            target.column()
        ))
        .bind(target.id())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Videos liked by `user_id`, most recent like first, each with its total like count
    pub async fn liked_videos(&self, user_id: Uuid) -> Result<Vec<LikedVideo>> {
        let rows = sqlx::query(
            r#"
            SELECT v.id, v.title, v.thumbnail_url, v.owner_id, l.created_at AS liked_at,
                   (SELECT COUNT(*) FROM likes lc WHERE lc.video_id = v.id) AS likes_count
            FROM likes l
            JOIN videos v ON v.id = l.video_id
            WHERE l.liked_by = $1
            ORDER BY l.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let videos = rows
            .into_iter()
            .map(|row| LikedVideo {
                video_id: row.get("id"),
                title: row.get("title"),
                thumbnail: row.get("thumbnail_url"),
                owner: row.get("owner_id"),
                likes_count: row.get("likes_count"),
                liked_at: row.get("liked_at"),
            })
            .collect();

        Ok(videos)
    }
}

impl ToggleRelation for LikeRepository {
    type Key = LikeKey;

    async fn remove(&self, key: &LikeKey) -> Result<bool> {
        let result = sqlx::query(&format!(
            "DELETE FROM likes WHERE {} = $1 AND liked_by = $2",
            key.target.column()
        ))
        .bind(key.target.id())
        .bind(key.liked_by)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert(&self, key: &LikeKey) -> Result<bool> {
        let result = sqlx::query(&format!(
            "INSERT INTO likes ({}, liked_by) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            key.target.column()
        ))
        .bind(key.target.id())
        .bind(key.liked_by)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
