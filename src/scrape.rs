use log::debug;
use serde::Deserialize;

use crate::error::TranscriptError;

// Literal markers in the watch-page HTML. The embedded player response is an
// undocumented, unversioned format; extraction is deliberately marker-based
// (split, bounded substring, then a structured parse of just that slice) so
// that shifted or malformed markup degrades to a taxonomy error instead of a
// crash.
const CAPTIONS_MARKER: &str = "\"captions\":";
const VIDEO_DETAILS_MARKER: &str = ",\"videoDetails";
const CAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";
const PLAYABILITY_MARKER: &str = "\"playabilityStatus\":";

/// One language-specific caption stream offered by the video. YouTube's JSON
/// carries more fields; these two are the only ones the client needs.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    #[serde(rename = "languageCode")]
    pub language_code: String,
}

#[derive(Debug, Deserialize)]
struct CaptionsBlob {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct TracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

/// Locate and parse the caption-track list embedded in the watch-page HTML.
pub fn extract_caption_tracks(
    video_id: &str,
    html: &str,
) -> Result<Vec<CaptionTrack>, TranscriptError> {
    let Some((_, after_marker)) = html.split_once(CAPTIONS_MARKER) else {
        if html.contains(CAPTCHA_MARKER) {
            return Err(TranscriptError::TooManyRequests);
        }
        if !html.contains(PLAYABILITY_MARKER) {
            return Err(TranscriptError::VideoUnavailable {
                video_id: video_id.to_string(),
            });
        }
        return Err(TranscriptError::TranscriptsDisabled {
            video_id: video_id.to_string(),
        });
    };

    let blob = after_marker
        .split_once(VIDEO_DETAILS_MARKER)
        .map(|(before, _)| before)
        .unwrap_or(after_marker)
        .replace('\n', "");

    // A blob that no longer parses means the embedding shifted under us;
    // that reads the same as captions being absent.
    let captions: CaptionsBlob = match serde_json::from_str(&blob) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("Caption blob for {video_id} did not parse: {e}");
            return Err(TranscriptError::TranscriptsDisabled {
                video_id: video_id.to_string(),
            });
        }
    };

    let Some(renderer) = captions.player_captions_tracklist_renderer else {
        return Err(TranscriptError::TranscriptsDisabled {
            video_id: video_id.to_string(),
        });
    };

    let Some(tracks) = renderer.caption_tracks else {
        return Err(TranscriptError::TranscriptNotAvailable {
            video_id: video_id.to_string(),
        });
    };

    Ok(tracks)
}

/// Pick the caption track to fetch: exact language-code match when a language
/// was requested, otherwise the first track (YouTube lists the default first;
/// no other ranking is applied).
pub fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    lang: Option<&str>,
    video_id: &str,
) -> Result<&'a CaptionTrack, TranscriptError> {
    if let Some(lang) = lang {
        return tracks
            .iter()
            .find(|t| t.language_code == lang)
            .ok_or_else(|| TranscriptError::NotAvailableLanguage {
                lang: lang.to_string(),
                available_langs: tracks.iter().map(|t| t.language_code.clone()).collect(),
                video_id: video_id.to_string(),
            });
    }
    tracks
        .first()
        .ok_or_else(|| TranscriptError::TranscriptNotAvailable {
            video_id: video_id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_tracks(tracks_json: &str) -> String {
        format!(
            r#"<html>"playabilityStatus":{{"status":"OK"}},"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":{tracks_json}}}}},"videoDetails":{{"videoId":"x"}}</html>"#
        )
    }

    #[test]
    fn test_extract_tracks() {
        let html = page_with_tracks(
            r#"[{"baseUrl":"https://example.com/en","languageCode":"en"},{"baseUrl":"https://example.com/de","languageCode":"de"}]"#,
        );
        let tracks = extract_caption_tracks("dQw4w9WgXcQ", &html).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].language_code, "en");
        assert_eq!(tracks[0].base_url, "https://example.com/en");
        assert_eq!(tracks[1].language_code, "de");
    }

    #[test]
    fn test_captcha_page() {
        let html = r#"<html><div class="g-recaptcha"></div></html>"#;
        assert!(matches!(
            extract_caption_tracks("dQw4w9WgXcQ", html),
            Err(TranscriptError::TooManyRequests)
        ));
    }

    #[test]
    fn test_no_playability_status() {
        let html = "<html><body>video gone</body></html>";
        assert!(matches!(
            extract_caption_tracks("dQw4w9WgXcQ", html),
            Err(TranscriptError::VideoUnavailable { .. })
        ));
    }

    #[test]
    fn test_marker_absent_but_playable() {
        let html = r#"<html>"playabilityStatus":{"status":"OK"}</html>"#;
        assert!(matches!(
            extract_caption_tracks("dQw4w9WgXcQ", html),
            Err(TranscriptError::TranscriptsDisabled { .. })
        ));
    }

    #[test]
    fn test_unparsable_blob_reads_as_disabled() {
        let html = r#""playabilityStatus":{},"captions":{{{garbage,"videoDetails":{}"#;
        assert!(matches!(
            extract_caption_tracks("dQw4w9WgXcQ", html),
            Err(TranscriptError::TranscriptsDisabled { .. })
        ));
    }

    #[test]
    fn test_missing_renderer_is_disabled() {
        let html = r#""captions":{},"videoDetails":{}"#;
        assert!(matches!(
            extract_caption_tracks("dQw4w9WgXcQ", html),
            Err(TranscriptError::TranscriptsDisabled { .. })
        ));
    }

    #[test]
    fn test_missing_caption_tracks_field() {
        let html = r#""captions":{"playerCaptionsTracklistRenderer":{"audioTracks":[]}},"videoDetails":{}"#;
        assert!(matches!(
            extract_caption_tracks("dQw4w9WgXcQ", html),
            Err(TranscriptError::TranscriptNotAvailable { .. })
        ));
    }

    #[test]
    fn test_newlines_in_blob_are_stripped() {
        let html = "\"captions\":{\n\"playerCaptionsTracklistRenderer\":{\n\"captionTracks\":[{\"baseUrl\":\"u\",\"languageCode\":\"en\"}]}}\n,\"videoDetails\":{}";
        let tracks = extract_caption_tracks("dQw4w9WgXcQ", html).unwrap();
        assert_eq!(tracks.len(), 1);
    }

    fn sample_tracks() -> Vec<CaptionTrack> {
        vec![
            CaptionTrack {
                base_url: "https://example.com/en".to_string(),
                language_code: "en".to_string(),
            },
            CaptionTrack {
                base_url: "https://example.com/de".to_string(),
                language_code: "de".to_string(),
            },
        ]
    }

    #[test]
    fn test_select_exact_language() {
        let tracks = sample_tracks();
        let track = select_track(&tracks, Some("de"), "dQw4w9WgXcQ").unwrap();
        assert_eq!(track.base_url, "https://example.com/de");
    }

    #[test]
    fn test_select_default_track() {
        let tracks = sample_tracks();
        let track = select_track(&tracks, None, "dQw4w9WgXcQ").unwrap();
        assert_eq!(track.language_code, "en");
    }

    #[test]
    fn test_select_missing_language_lists_available() {
        let tracks = sample_tracks();
        let err = select_track(&tracks, Some("fr"), "dQw4w9WgXcQ").unwrap_err();
        match err {
            TranscriptError::NotAvailableLanguage {
                lang,
                available_langs,
                video_id,
            } => {
                assert_eq!(lang, "fr");
                assert_eq!(available_langs, vec!["en".to_string(), "de".to_string()]);
                assert_eq!(video_id, "dQw4w9WgXcQ");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_select_from_empty_track_list() {
        let err = select_track(&[], None, "dQw4w9WgXcQ").unwrap_err();
        assert!(matches!(err, TranscriptError::TranscriptNotAvailable { .. }));
    }
}
