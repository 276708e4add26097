//! Tweet repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::tweet::Tweet;

/// Tweet repository
#[derive(Clone)]
pub struct TweetRepository {
    pool: PgPool,
}

impl TweetRepository {
    /// Create a new tweet repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner_id: Uuid, content: &str) -> Result<Tweet> {
        let tweet = sqlx::query_as::<_, Tweet>(
            r#"
            INSERT INTO tweets (content, owner_id)
            VALUES ($1, $2)
            RETURNING id, content, owner_id, created_at, updated_at
            "#,
        )
        .bind(content)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(tweet)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>(
            "SELECT id, content, owner_id, created_at, updated_at FROM tweets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tweet)
    }

    /// Tweets of a user, newest first
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Tweet>> {
        let tweets = sqlx::query_as::<_, Tweet>(
            r#"
            SELECT id, content, owner_id, created_at, updated_at
            FROM tweets
            WHERE owner_id = $1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tweets)
    }

    pub async fn update(&self, id: Uuid, content: &str) -> Result<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>(
            r#"
            UPDATE tweets SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, content, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tweet)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
