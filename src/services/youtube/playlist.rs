//! Playlist URL → video ID list.
//!
//! Uses the YouTube Data API when a key is configured and falls back to
//! `yt-dlp --flat-playlist`. Failures never surface: the caller just gets an empty list.

use serde::Deserialize;
use serde_json::Value;

use super::{extract_playlist_id, run_ytdlp, TranscriptError, DEFAULT_YTDLP};

const DATA_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const PAGE_SIZE: &str = "50";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    video_id: String,
}

pub struct PlaylistResolver {
    client: reqwest::Client,
    api_key: Option<String>,
    ytdlp_binary: String,
}

impl PlaylistResolver {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            ytdlp_binary: DEFAULT_YTDLP.to_string(),
        }
    }

    pub async fn get_playlist_videos(&self, url: &str) -> Vec<String> {
        let Some(playlist_id) = extract_playlist_id(url) else {
            tracing::warn!(url, "URL does not contain a playlist id");
            return Vec::new();
        };

        if let Some(key) = &self.api_key {
            match self.fetch_via_api(&playlist_id, key).await {
                Ok(ids) => return ids,
                Err(e) => {
                    tracing::warn!(playlist_id = %playlist_id, error = %e, "Data API lookup failed, trying yt-dlp");
                }
            }
        }

        match self.fetch_via_ytdlp(&playlist_id).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(playlist_id = %playlist_id, error = %e, "Failed to resolve playlist");
                Vec::new()
            }
        }
    }

    async fn fetch_via_api(&self, playlist_id: &str, key: &str) -> Result<Vec<String>, reqwest::Error> {
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(format!("{}/playlistItems", DATA_API_BASE))
                .query(&[
                    ("part", "contentDetails"),
                    ("maxResults", PAGE_SIZE),
                    ("playlistId", playlist_id),
                    ("key", key),
                ]);
            if let Some(token) = page_token.take() {
                request = request.query(&[("pageToken", token)]);
            }

            let page: PlaylistItemsResponse = request
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            ids.extend(page.items.into_iter().map(|item| item.content_details.video_id));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(playlist_id, count = ids.len(), "Resolved playlist via Data API");
        Ok(ids)
    }

    async fn fetch_via_ytdlp(&self, playlist_id: &str) -> Result<Vec<String>, TranscriptError> {
        let url = format!("https://www.youtube.com/playlist?list={}", playlist_id);
        let info = run_ytdlp(
            &self.ytdlp_binary,
            &[url.as_str(), "--flat-playlist", "--dump-single-json", "--no-warnings"],
        )
        .await?;

        Ok(ids_from_flat_playlist(&info))
    }
}

/// `--flat-playlist` output lists videos under `entries`; a single video has just `id`.
fn ids_from_flat_playlist(info: &Value) -> Vec<String> {
    match info.get("entries").and_then(Value::as_array) {
        Some(entries) => entries
            .iter()
            .filter_map(|e| e.get("id").and_then(Value::as_str))
            .map(String::from)
            .collect(),
        None => info
            .get("id")
            .and_then(Value::as_str)
            .map(|id| vec![id.to_string()])
            .unwrap_or_default(),
    }
}
