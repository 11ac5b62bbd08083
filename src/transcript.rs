use log::debug;
use regex::Regex;

use crate::TranscriptSegment;

/// Extract timed segments from the caption payload. This is deliberate
/// pattern matching on the `<text start=".." dur="..">..</text>` shape rather
/// than a full XML parse: the payload is not guaranteed well-formed and the
/// shape has been stable far longer than the surrounding markup. Attribute
/// order and surrounding whitespace are tolerated; a `<text>` element missing
/// either attribute is skipped. Zero matches is a valid empty result.
pub fn parse_transcript(raw: &str, lang: Option<&str>) -> Vec<TranscriptSegment> {
    let tag_re = Regex::new(r"<text\s+([^>]*)>([^<]*)</text>").unwrap();
    let start_re = Regex::new(r#"start\s*=\s*"([^"]*)""#).unwrap();
    let dur_re = Regex::new(r#"dur\s*=\s*"([^"]*)""#).unwrap();

    let mut segments = Vec::new();
    for caps in tag_re.captures_iter(raw) {
        let attrs = &caps[1];
        let (Some(start), Some(dur)) = (
            start_re.captures(attrs).map(|c| c[1].to_string()),
            dur_re.captures(attrs).map(|c| c[1].to_string()),
        ) else {
            continue;
        };

        // Caption bodies arrive double-escaped ("&amp;#39;"), hence two passes.
        let once = html_escape::decode_html_entities(&caps[2]).to_string();
        let text = html_escape::decode_html_entities(&once).to_string();

        segments.push(TranscriptSegment {
            text,
            offset: parse_seconds(&start),
            duration: parse_seconds(&dur),
            lang: lang.map(|l| l.to_string()),
        });
    }
    segments
}

/// Non-numeric timestamps produce NaN rather than failing the whole parse;
/// one bad attribute should not discard an otherwise usable transcript.
fn parse_seconds(value: &str) -> f64 {
    value.parse::<f64>().unwrap_or_else(|_| {
        debug!("Non-numeric timestamp attribute: {value:?}");
        f64::NAN
    })
}
