use async_trait::async_trait;
use log::debug;

use crate::error::TranscriptError;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// One outbound request as the client sees it: the URL plus the two headers
/// the scraper cares about.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub lang: Option<String>,
    pub user_agent: String,
}

/// The slice of an HTTP response the client consumes.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub ok: bool,
    pub body: String,
}

/// Transport seam for both outbound requests. The client never constructs
/// requests itself, so swapping this out (proxying, testing) replaces the
/// transport entirely. No retries at this layer; a non-OK status comes back
/// as `ok: false` and transport failures as `TranscriptError::Request`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, TranscriptError>;
}

/// Default transport backed by a shared `reqwest::Client`.
pub struct DefaultFetcher {
    client: reqwest::Client,
}

impl DefaultFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for DefaultFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for DefaultFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, TranscriptError> {
        debug!("Fetching {}", request.url);
        let mut builder = self
            .client
            .get(&request.url)
            .header("User-Agent", &request.user_agent);
        if let Some(ref lang) = request.lang {
            builder = builder.header("Accept-Language", lang);
        }
        let response = builder.send().await?;
        let ok = response.status().is_success();
        let body = response.text().await?;
        Ok(FetchResponse { ok, body })
    }
}
