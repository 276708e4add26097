//! Playlist repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::playlist::Playlist;

const PLAYLIST_SELECT: &str = r#"
    SELECT p.id, p.name, p.description, p.owner_id, p.created_at, p.updated_at,
           ARRAY(
               SELECT pv.video_id FROM playlist_videos pv
               WHERE pv.playlist_id = p.id
               ORDER BY pv.added_at, pv.video_id
           ) AS videos
    FROM playlists p
"#;

/// Playlist repository
#[derive(Clone)]
pub struct PlaylistRepository {
    pool: PgPool,
}

impl PlaylistRepository {
    /// Create a new playlist repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a playlist, or return the existing one with the same
    /// (name, description, owner). The flag is true when a row was created.
    pub async fn create_or_get(
        &self,
        owner_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<(Playlist, bool)> {
        let inserted: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO playlists (name, description, owner_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (name, description, owner_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        let created = inserted.is_some();
        let id = match inserted {
            Some(id) => id,
            None => {
                sqlx::query_scalar(
                    "SELECT id FROM playlists WHERE name = $1 AND description = $2 AND owner_id = $3",
                )
                .bind(name)
                .bind(description)
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?
            }
        };

        let playlist = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Playlist {} vanished after creation", id))?;

        if created {
            info!("Created playlist {} for {}", id, owner_id);
        }

        Ok((playlist, created))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!("{PLAYLIST_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(playlist)
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Playlist>> {
        let playlists = sqlx::query_as::<_, Playlist>(&format!(
            "{PLAYLIST_SELECT} WHERE p.owner_id = $1 ORDER BY p.created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }

    /// Rename a playlist; a clash with another playlist of the owner is a unique violation
    pub async fn update(&self, id: Uuid, name: &str, description: &str) -> Result<Option<Playlist>> {
        let updated = sqlx::query(
            "UPDATE playlists SET name = $2, description = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Add a video; adding one already present changes nothing
    pub async fn add_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO playlist_videos (playlist_id, video_id)
            VALUES ($1, $2)
            ON CONFLICT (playlist_id, video_id) DO NOTHING
            "#,
        )
        .bind(playlist_id)
        .bind(video_id)
        .execute(&self.pool)
        .await?;

        self.touch(playlist_id).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2")
                .bind(playlist_id)
                .bind(video_id)
                .execute(&self.pool)
                .await?;

        self.touch(playlist_id).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn touch(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE playlists SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
