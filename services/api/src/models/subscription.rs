//! Subscription relation and its projections

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Composite key of a subscription: (subscriber, channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionKey {
    pub subscriber_id: Uuid,
    pub channel_id: Uuid,
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription:{}:{}", self.subscriber_id, self.channel_id)
    }
}

/// User on the other side of a subscription
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMember {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
    pub subscribed_at: DateTime<Utc>,
}
