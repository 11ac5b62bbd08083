pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod scrape;
pub mod transcript;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use cache::{CacheStrategy, FsCache, InMemoryCache, DEFAULT_CACHE_TTL_MS};
pub use client::{fetch_transcript, TranscriptClient};
pub use error::TranscriptError;
pub use fetch::{DefaultFetcher, FetchRequest, FetchResponse, Fetcher, DEFAULT_USER_AGENT};

/// One timed caption line: text plus start offset and duration, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub offset: f64,
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// Per-client configuration. The client holds shared references to the cache
/// and fetchers; it never owns their lifecycle.
#[derive(Clone, Default)]
pub struct TranscriptConfig {
    /// Caption language to select; `None` means the video's default track.
    pub lang: Option<String>,
    /// Overrides [`DEFAULT_USER_AGENT`] on both outbound requests.
    pub user_agent: Option<String>,
    /// Optional cache consulted before fetching and written after a success.
    pub cache: Option<Arc<dyn CacheStrategy>>,
    /// Cache TTL in milliseconds; falls back to the strategy's default.
    pub cache_ttl: Option<i64>,
    /// Force `http://` on both outbound URLs.
    pub disable_https: bool,
    /// Replaces the transport for the video-page request (e.g. a proxy).
    pub video_fetcher: Option<Arc<dyn Fetcher>>,
    /// Replaces the transport for the caption-XML request.
    pub transcript_fetcher: Option<Arc<dyn Fetcher>>,
}

/// Normalize a bare 11-character video ID or any recognized YouTube URL shape
/// into the video ID. Domain matching is case-insensitive; patterns are tried
/// in a fixed order and the first match wins.
pub fn retrieve_video_id(input: &str) -> Result<String, TranscriptError> {
    let trimmed = input.trim();

    // Bare 11-character video ID
    if regex::Regex::new(r"^[a-zA-Z0-9_-]{11}$").unwrap().is_match(trimmed) {
        return Ok(trimmed.to_string());
    }

    let url_patterns = [
        r"(?i:youtube\.com/watch\?.*v=)([a-zA-Z0-9_-]{11})",
        r"(?i:youtu\.be/)([a-zA-Z0-9_-]{11})",
        r"(?i:youtube\.com/embed/)([a-zA-Z0-9_-]{11})",
        r"(?i:youtube\.com/v/)([a-zA-Z0-9_-]{11})",
        r"(?i:youtube\.com/shorts/)([a-zA-Z0-9_-]{11})",
        r"(?i:youtube\.com/live/)([a-zA-Z0-9_-]{11})",
    ];

    for pattern in url_patterns {
        if let Some(caps) = regex::Regex::new(pattern).unwrap().captures(trimmed) {
            return Ok(caps[1].to_string());
        }
    }

    Err(TranscriptError::InvalidVideoId {
        input: input.to_string(),
    })
}
