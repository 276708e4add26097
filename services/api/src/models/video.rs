//! Video model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Video entity
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    #[serde(rename = "owner")]
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "videoFile")]
    pub video_url: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Published videos are public; unpublished ones only exist for their owner
    pub fn is_visible_to(&self, viewer: Uuid) -> bool {
        self.is_published || self.owner_id == viewer
    }
}

/// New video creation payload
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration: f64,
}

/// Video update payload
#[derive(Debug, Clone)]
pub struct VideoUpdate {
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
}

/// Sortable video columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSort {
    CreatedAt,
    Views,
    Duration,
    Title,
}

impl VideoSort {
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.unwrap_or("createdAt") {
            "createdAt" | "created_at" => Some(VideoSort::CreatedAt),
            "views" => Some(VideoSort::Views),
            "duration" => Some(VideoSort::Duration),
            "title" => Some(VideoSort::Title),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            VideoSort::CreatedAt => "created_at",
            VideoSort::Views => "views",
            VideoSort::Duration => "duration",
            VideoSort::Title => "title",
        }
    }
}

/// Query parameters for video listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
    /// Search term matched against title and description
    pub query: Option<String>,
    /// Sort field
    pub sort_by: Option<String>,
    /// Sort order (asc or desc)
    pub sort_type: Option<String>,
    /// Filter by owner
    pub user_id: Option<Uuid>,
}

/// Validated listing parameters
#[derive(Debug, Clone)]
pub struct VideoFilter {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub sort: VideoSort,
    pub descending: bool,
    pub owner_id: Option<Uuid>,
    pub include_unpublished: bool,
}

/// Owner projection embedded in watch history entries
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub avatar: String,
}

/// Watch history entry: the video with its owner embedded
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedVideo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "videoFile")]
    pub video_url: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub owner: OwnerSummary,
    pub watched_at: DateTime<Utc>,
}
