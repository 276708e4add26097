//! Aggregated channel views

use serde::Serialize;
use uuid::Uuid;

/// Per-video statistics of a channel
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelVideoStats {
    pub video_id: Uuid,
    pub title: String,
    pub views: i64,
    pub likes_count: i64,
    pub subscribers_count: i64,
    pub owner: Uuid,
}

/// Public channel profile with subscription counters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub avatar: String,
    pub cover_image: String,
    pub subscribers_count: i64,
    pub channels_subscribed_to_count: i64,
    pub is_subscribed: bool,
}

/// Totals across a channel, for the dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelTotals {
    pub total_videos: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_subscribers: i64,
}

/// Dashboard body: totals plus the per-video breakdown
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDashboard {
    #[serde(flatten)]
    pub totals: ChannelTotals,
    pub videos: Vec<ChannelVideoStats>,
}
