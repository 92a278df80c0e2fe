//! YouTube Data API v3 publishing client.
//!
//! This crate provides:
//! - Per-job OAuth2 access-token minting from a long-lived refresh token
//! - Resumable video upload with a streamed file body
//! - Delete-by-id for previously published videos
//! - Watch-URL synthesis and video-id extraction

pub mod auth;
pub mod client;
pub mod error;
pub mod url;

pub use auth::{AccessToken, OAuthConfig};
pub use client::{UploadMetadata, VideoHost, YouTubeClient};
pub use error::{YouTubeError, YouTubeResult};
pub use url::{extract_video_id, watch_url};
