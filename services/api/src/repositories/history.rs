//! Watch history and the distinct-viewer count derived from it

use anyhow::Result;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::video::{OwnerSummary, Video, WatchedVideo};
use crate::repositories::video::VIDEO_COLUMNS;

/// Watch history repository
#[derive(Clone)]
pub struct HistoryRepository {
    pool: PgPool,
}

impl HistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add `video_id` to the user's history (set-like, first insertion order kept)
    /// and recompute the video's views from the number of distinct viewers.
    /// Views never decrease. `None` when the video does not exist.
    pub async fn record_view(&self, video_id: Uuid, user_id: Uuid) -> Result<Option<Video>> {
        let mut tx = self.pool.begin().await?;

        // Row lock first: concurrent viewers of one video recount in turn, each
        // seeing the history rows committed before it.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM videos WHERE id = $1 FOR UPDATE")
                .bind(video_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let appended = sqlx::query(
            r#"
            INSERT INTO watch_history (user_id, video_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, video_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        let video = sqlx::query_as::<_, Video>(&format!(
            r#"
            UPDATE videos
            SET views = GREATEST(
                views,
                (SELECT COUNT(DISTINCT user_id) FROM watch_history WHERE video_id = $1)
            )
            WHERE id = $1
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(video_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if appended {
            info!("User {} watched video {}", user_id, video_id);
        }

        Ok(Some(video))
    }

    /// The user's history in stored order, each video with its owner
    pub async fn watch_history(&self, user_id: Uuid) -> Result<Vec<WatchedVideo>> {
        let rows = sqlx::query(
            r#"
            SELECT v.id, v.owner_id, v.title, v.description, v.video_url, v.thumbnail_url,
                   v.duration, v.views, v.is_published, v.created_at,
                   u.full_name AS owner_full_name, u.username AS owner_username,
                   u.avatar_url AS owner_avatar, h.watched_at
            FROM watch_history h
            JOIN videos v ON v.id = h.video_id
            JOIN users u ON u.id = v.owner_id
            WHERE h.user_id = $1
            ORDER BY h.seq
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let history = rows
            .into_iter()
            .map(|row| WatchedVideo {
                id: row.get("id"),
                title: row.get("title"),
                description: row.get("description"),
                video_url: row.get("video_url"),
                thumbnail_url: row.get("thumbnail_url"),
                duration: row.get("duration"),
                views: row.get("views"),
                is_published: row.get("is_published"),
                created_at: row.get("created_at"),
                owner: OwnerSummary {
                    id: row.get("owner_id"),
                    full_name: row.get("owner_full_name"),
                    username: row.get("owner_username"),
                    avatar: row.get("owner_avatar"),
                },
                watched_at: row.get("watched_at"),
            })
            .collect();

        Ok(history)
    }
}
