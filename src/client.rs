use std::sync::Arc;

use log::debug;

use crate::error::TranscriptError;
use crate::fetch::{DefaultFetcher, FetchRequest, Fetcher, DEFAULT_USER_AGENT};
use crate::scrape::{extract_caption_tracks, select_track};
use crate::transcript::parse_transcript;
use crate::{retrieve_video_id, TranscriptConfig, TranscriptSegment};

/// Orchestrates one transcript retrieval: resolve the ID, consult the cache,
/// scrape the watch page for caption tracks, pick one, fetch and parse its
/// XML, then store the result. Every stage failure short-circuits to the
/// caller as a [`TranscriptError`]; nothing is retried here.
pub struct TranscriptClient {
    config: TranscriptConfig,
    default_fetcher: Arc<dyn Fetcher>,
}

impl TranscriptClient {
    pub fn new(config: TranscriptConfig) -> Self {
        Self {
            config,
            default_fetcher: Arc::new(DefaultFetcher::new()),
        }
    }

    pub async fn fetch_transcript(
        &self,
        video_id_or_url: &str,
    ) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        let video_id = retrieve_video_id(video_id_or_url)?;
        let lang = self.config.lang.as_deref();
        let user_agent = self
            .config
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        // Cache is partitioned by video and language only; other config
        // (user agent, protocol) shares entries.
        let cache_key = format!("transcript:{video_id}:{}", lang.unwrap_or("default"));

        if let Some(ref cache) = self.config.cache {
            if let Some(cached) = cache.get(&cache_key).await {
                match serde_json::from_str::<Vec<TranscriptSegment>>(&cached) {
                    Ok(segments) => {
                        debug!("Cache hit for {cache_key}");
                        return Ok(segments);
                    }
                    Err(e) => debug!("Ignoring undecodable cache entry {cache_key}: {e}"),
                }
            }
        }

        let protocol = if self.config.disable_https { "http" } else { "https" };
        let video_fetcher = self
            .config
            .video_fetcher
            .clone()
            .unwrap_or_else(|| self.default_fetcher.clone());

        let page = video_fetcher
            .fetch(&FetchRequest {
                url: format!("{protocol}://www.youtube.com/watch?v={video_id}"),
                lang: lang.map(str::to_string),
                user_agent: user_agent.clone(),
            })
            .await?;

        if !page.ok {
            return Err(TranscriptError::VideoUnavailable { video_id });
        }

        let tracks = extract_caption_tracks(&video_id, &page.body)?;
        let track = select_track(&tracks, lang, &video_id)?;
        debug!("Selected caption track: lang={}", track.language_code);

        let transcript_url = if self.config.disable_https {
            track.base_url.replacen("https://", "http://", 1)
        } else {
            track.base_url.clone()
        };

        let transcript_fetcher = self
            .config
            .transcript_fetcher
            .clone()
            .unwrap_or_else(|| self.default_fetcher.clone());

        let response = transcript_fetcher
            .fetch(&FetchRequest {
                url: transcript_url,
                lang: lang.map(str::to_string),
                user_agent,
            })
            .await?;

        if !response.ok {
            return Err(TranscriptError::TranscriptNotAvailable { video_id });
        }

        let segment_lang = lang
            .map(str::to_string)
            .or_else(|| tracks.first().map(|t| t.language_code.clone()));
        let segments = parse_transcript(&response.body, segment_lang.as_deref());
        debug!("Parsed {} segments for {video_id}", segments.len());

        if let Some(ref cache) = self.config.cache {
            let serialized = serde_json::to_string(&segments).map_err(std::io::Error::other)?;
            cache
                .set(&cache_key, &serialized, self.config.cache_ttl)
                .await?;
        }

        Ok(segments)
    }
}

/// One-shot convenience wrapper around [`TranscriptClient`].
pub async fn fetch_transcript(
    video_id_or_url: &str,
    config: TranscriptConfig,
) -> Result<Vec<TranscriptSegment>, TranscriptError> {
    TranscriptClient::new(config).fetch_transcript(video_id_or_url).await
}
