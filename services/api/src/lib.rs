//! Video platform HTTP API
//!
//! Users publish videos, comment, like, subscribe to channels, curate
//! playlists and post tweets. Handlers live in [`routes`], persistence in
//! [`repositories`]; shared wiring is carried by [`state::AppState`].

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod rate_limiter;
pub mod repositories;
pub mod response;
pub mod routes;
pub mod state;
pub mod storage;
pub mod toggle;
pub mod upload;
pub mod validation;

use sqlx::migrate::Migrator;

/// Schema migrations embedded at compile time
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");
