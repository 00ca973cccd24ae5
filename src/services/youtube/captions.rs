//! Caption payload parsing.
//!
//! YouTube hands captions out in several shapes depending on where the URL came
//! from: timed-text XML (`<text>` or srv3 `<p>` cues), json3 (`events[].segs[]`)
//! and WebVTT from yt-dlp. Everything here is pure string work.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

static TEXT_CUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<text([^>]*)>(.*?)</text>"#).expect("valid regex"));
static P_CUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<p\s([^>]*)>(.*?)</p>"#).expect("valid regex"));
static DUR_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bdur="([0-9.]+)""#).expect("valid regex"));
static D_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bd="([0-9]+)""#).expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// `"asr"` for auto-generated tracks.
    pub kind: Option<String>,
}

impl CaptionTrack {
    fn is_english(&self) -> bool {
        self.language_code == "en" || self.language_code.starts_with("en-")
    }

    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Pulls the `captionTracks` array out of a watch page.
pub fn find_caption_tracks(html: &str) -> Option<Vec<CaptionTrack>> {
    let key = "\"captionTracks\":";
    let start = html.find(key)? + key.len();
    let array = extract_json_array(&html[start..])?;
    serde_json::from_str(array).ok()
}

/// Returns the balanced `[...]` at the start of `s` (leading whitespace allowed).
///
/// Brackets inside JSON strings are ignored.
pub fn extract_json_array(s: &str) -> Option<&str> {
    let trimmed = s.trim_start();
    let offset = s.len() - trimmed.len();
    if !trimmed.starts_with('[') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in trimmed.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&s[offset..offset + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// English manual track, then English auto-generated, then whatever comes first.
pub fn select_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.is_english() && !t.is_generated())
        .or_else(|| tracks.iter().find(|t| t.is_english()))
        .or_else(|| tracks.first())
}

/// Parses timed-text XML into `(text, total duration in seconds)`.
///
/// Handles both the classic `<text start dur>` format and srv3 `<p t d>` (milliseconds).
pub fn parse_timed_text(xml: &str) -> Option<(String, f64)> {
    let mut pieces = Vec::new();
    let mut duration = 0.0;

    if xml.contains("<text") {
        for cap in TEXT_CUE.captures_iter(xml) {
            if let Some(d) = DUR_ATTR.captures(&cap[1]) {
                duration += d[1].parse::<f64>().unwrap_or(0.0);
            }
            pieces.push(clean_cue(&cap[2]));
        }
    } else {
        for cap in P_CUE.captures_iter(xml) {
            if let Some(d) = D_ATTR.captures(&cap[1]) {
                duration += d[1].parse::<f64>().unwrap_or(0.0) / 1000.0;
            }
            pieces.push(clean_cue(&cap[2]));
        }
    }

    let text = join_non_empty(pieces);
    if text.is_empty() {
        None
    } else {
        Some((text, duration))
    }
}

/// Normalises whatever body a caption URL returned into plain text.
pub fn normalize_caption_body(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(events) = json.get("events").and_then(Value::as_array) {
            let pieces = events
                .iter()
                .filter_map(|e| e.get("segs").and_then(Value::as_array))
                .map(|segs| {
                    segs.iter()
                        .filter_map(|s| s.get("utf8").and_then(Value::as_str))
                        .collect::<String>()
                        .replace('\n', " ")
                })
                .map(|s| collapse_whitespace(&s))
                .collect();
            return join_non_empty(pieces);
        }
        return body.trim().to_string();
    }

    if body.contains("<text") || body.contains("<p ") {
        return collapse_whitespace(&decode_entities(&TAG.replace_all(body, " ")));
    }

    if body.trim_start().starts_with("WEBVTT") {
        return body
            .lines()
            .map(str::trim)
            .filter(|line| {
                !line.is_empty()
                    && !line.contains("-->")
                    && !line.starts_with("WEBVTT")
                    && !line.starts_with("Kind:")
                    && !line.starts_with("Language:")
            })
            .map(|line| TAG.replace_all(line, "").into_owned())
            .collect::<Vec<_>>()
            .join(" ");
    }

    body.trim().to_string()
}

pub fn decode_entities(s: &str) -> String {
    ENTITY
        .replace_all(s, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ => None,
                }
            };

            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn clean_cue(raw: &str) -> String {
    // Timed text is often double-escaped (`&amp;#39;`).
    let once = decode_entities(raw);
    let twice = decode_entities(&once);
    collapse_whitespace(&TAG.replace_all(&twice, " "))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn join_non_empty(pieces: Vec<String>) -> String {
    pieces
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_tracks_in_watch_page() {
        let html = r#"var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en","name":{"runs":[{"text":"English [auto]"}]},"languageCode":"en","kind":"asr"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=de","name":{"simpleText":"Deutsch ]"}, "languageCode":"de"}],"audioTracks":[]}}};"#;

        let tracks = find_caption_tracks(html).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].base_url, "https://www.youtube.com/api/timedtext?v=abc&lang=en");
        assert_eq!(tracks[0].kind.as_deref(), Some("asr"));
        assert_eq!(tracks[1].language_code, "de");
    }

    #[test]
    fn page_without_captions_has_no_tracks() {
        assert!(find_caption_tracks("<html>no captions here</html>").is_none());
    }

    #[test]
    fn prefers_manual_english_track() {
        let track = |lang: &str, kind: Option<&str>| CaptionTrack {
            base_url: format!("https://example.com/{}", lang),
            language_code: lang.to_string(),
            kind: kind.map(String::from),
        };

        let tracks = vec![track("de", None), track("en", Some("asr")), track("en-GB", None)];
        assert_eq!(select_track(&tracks).unwrap().language_code, "en-GB");

        let tracks = vec![track("de", None), track("en", Some("asr"))];
        assert_eq!(select_track(&tracks).unwrap().language_code, "en");

        let tracks = vec![track("fr", None), track("de", None)];
        assert_eq!(select_track(&tracks).unwrap().language_code, "fr");

        assert!(select_track(&[]).is_none());
    }

    #[test]
    fn parses_classic_timed_text() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.5" dur="2.5">Hello &amp;amp; welcome</text><text start="3" dur="1.5">it&amp;#39;s   time</text><text start="5" dur="1"></text></transcript>"#;

        let (text, duration) = parse_timed_text(xml).unwrap();
        assert_eq!(text, "Hello & welcome it's time");
        assert!((duration - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_srv3_timed_text() {
        let xml = r#"<timedtext format="3"><body><p t="0" d="1500"><s>Hi</s><s> there</s></p><p t="1500" d="500">bye</p></body></timedtext>"#;

        let (text, duration) = parse_timed_text(xml).unwrap();
        assert_eq!(text, "Hi there bye");
        assert!((duration - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_timed_text_is_none() {
        assert!(parse_timed_text("<transcript></transcript>").is_none());
    }

    #[test]
    fn normalizes_json3() {
        let body = r#"{"events":[{"tStartMs":0},{"segs":[{"utf8":"Hello"},{"utf8":" world"}]},{"segs":[{"utf8":"\n"}]},{"segs":[{"utf8":"again"}]}]}"#;
        assert_eq!(normalize_caption_body(body), "Hello world again");
    }

    #[test]
    fn normalizes_vtt() {
        let body = "WEBVTT\nKind: captions\nLanguage: en\n\n00:00:00.000 --> 00:00:01.000\nFirst <c>line</c>\n\n00:00:01.000 --> 00:00:02.000\nSecond line\n";
        assert_eq!(normalize_caption_body(body), "First line Second line");
    }

    #[test]
    fn normalizes_xml_and_plain_text() {
        assert_eq!(
            normalize_caption_body("<transcript><text start=\"0\">a &lt;b&gt;</text></transcript>"),
            "a <b>"
        );
        assert_eq!(normalize_caption_body("  just text \n"), "just text");
    }

    #[test]
    fn decodes_numeric_entities() {
        assert_eq!(decode_entities("&#39;&#x41;&unknown;"), "'A&unknown;");
    }
}
