//! API models for entities and request/response payloads

pub mod channel;
pub mod comment;
pub mod like;
pub mod playlist;
pub mod subscription;
pub mod tweet;
pub mod user;
pub mod video;

use serde::Deserialize;

/// Request carrying a single text body (comments, tweets)
#[derive(Debug, Clone, Deserialize)]
pub struct ContentRequest {
    pub content: Option<String>,
}

/// Query parameters for paginated listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
}
