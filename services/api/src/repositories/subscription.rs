//! Subscription repository: toggle storage and member listings

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::subscription::{ChannelMember, SubscriptionKey};
use crate::toggle::ToggleRelation;

/// Subscription repository
#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Users subscribed to `channel_id`
    pub async fn subscribers(&self, channel_id: Uuid) -> Result<Vec<ChannelMember>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.username, u.full_name, u.avatar_url, s.created_at
            FROM subscriptions s
            JOIN users u ON u.id = s.subscriber_id
            WHERE s.channel_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }

    /// Channels `subscriber_id` is subscribed to
    pub async fn subscribed_channels(&self, subscriber_id: Uuid) -> Result<Vec<ChannelMember>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.username, u.full_name, u.avatar_url, s.created_at
            FROM subscriptions s
            JOIN users u ON u.id = s.channel_id
            WHERE s.subscriber_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(subscriber_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }
}

fn member_from_row(row: &PgRow) -> ChannelMember {
    ChannelMember {
        id: row.get("id"),
        username: row.get("username"),
        full_name: row.get("full_name"),
        avatar: row.get("avatar_url"),
        subscribed_at: row.get("created_at"),
    }
}

impl ToggleRelation for SubscriptionRepository {
    type Key = SubscriptionKey;

    async fn remove(&self, key: &SubscriptionKey) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2")
                .bind(key.subscriber_id)
                .bind(key.channel_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert(&self, key: &SubscriptionKey) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (subscriber_id, channel_id)
            VALUES ($1, $2)
            ON CONFLICT (subscriber_id, channel_id) DO NOTHING
            "#,
        )
        .bind(key.subscriber_id)
        .bind(key.channel_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
