//! Video repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::models::video::{NewVideo, Video, VideoFilter, VideoUpdate};
use crate::response::page_offset;

pub(crate) const VIDEO_COLUMNS: &str = "id, owner_id, title, description, video_url, thumbnail_url, \
                                        duration, views, is_published, created_at, updated_at";

/// Video repository
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    /// Create a new video repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_video: &NewVideo) -> Result<Video> {
        info!("Publishing video '{}' for {}", new_video.title, new_video.owner_id);

        let video = sqlx::query_as::<_, Video>(&format!(
            r#"
            INSERT INTO videos (owner_id, title, description, video_url, thumbnail_url, duration)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(new_video.owner_id)
        .bind(&new_video.title)
        .bind(&new_video.description)
        .bind(&new_video.video_url)
        .bind(&new_video.thumbnail_url)
        .bind(new_video.duration)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM videos WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Page of videos matching `filter`, with the total match count
    pub async fn list(&self, filter: &VideoFilter) -> Result<(Vec<Video>, i64)> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM videos");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {VIDEO_COLUMNS} FROM videos"));
        push_filters(&mut query, filter);
        // column and direction come from a whitelist, never from raw input
        query.push(format!(
            " ORDER BY {} {}, id",
            filter.sort.column(),
            if filter.descending { "DESC" } else { "ASC" }
        ));
        query
            .push(" LIMIT ")
            .push_bind(i64::from(filter.limit))
            .push(" OFFSET ")
            .push_bind(page_offset(filter.page, filter.limit));

        let videos = query
            .build_query_as::<Video>()
            .fetch_all(&self.pool)
            .await?;

        Ok((videos, total))
    }

    /// All videos of a channel, published or not, newest first
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Video>> {
        let videos = sqlx::query_as::<_, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    /// Update title/description, and the thumbnail when a new one is given
    pub async fn update(&self, id: Uuid, update: &VideoUpdate) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!(
            r#"
            UPDATE videos
            SET title = $2,
                description = $3,
                thumbnail_url = COALESCE($4, thumbnail_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.thumbnail_url.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    pub async fn toggle_publish(&self, id: Uuid) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!(
            r#"
            UPDATE videos
            SET is_published = NOT is_published, updated_at = NOW()
            WHERE id = $1
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    /// Delete a video; comments, likes, memberships and history rows go with it
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        info!("Deleting video {}", id);

        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &VideoFilter) {
    query.push(" WHERE TRUE");

    if !filter.include_unpublished {
        query.push(" AND is_published");
    }

    if let Some(owner_id) = filter.owner_id {
        query.push(" AND owner_id = ").push_bind(owner_id);
    }

    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search);
        query
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR description ILIKE ")
            .push_bind(pattern)
            .push(r" ESCAPE '\')");
    }
}

/// `ILIKE` pattern matching `search` literally anywhere in the text
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
