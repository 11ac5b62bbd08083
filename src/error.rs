use thiserror::Error;

/// Everything that can go wrong while fetching a transcript. Each network or
/// parse stage maps its failure to exactly one variant; nothing is retried
/// internally.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error(
        "invalid YouTube video ID or URL: {input:?} (expected an 11-character ID or a watch/youtu.be/embed/v/shorts/live URL)"
    )]
    InvalidVideoId { input: String },

    #[error("video {video_id} is unavailable or has been removed")]
    VideoUnavailable { video_id: String },

    #[error("transcripts are disabled for video {video_id}")]
    TranscriptsDisabled { video_id: String },

    #[error("no transcript is available for video {video_id}")]
    TranscriptNotAvailable { video_id: String },

    #[error(
        "no transcript in {lang:?} for video {video_id}; available languages: {}",
        .available_langs.join(", ")
    )]
    NotAvailableLanguage {
        lang: String,
        available_langs: Vec<String>,
        video_id: String,
    },

    #[error(
        "YouTube is receiving too many requests from this IP (captcha page returned); try again later or use a proxy"
    )]
    TooManyRequests,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
