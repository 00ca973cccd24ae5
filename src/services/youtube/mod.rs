//! # YouTube 자막 수집
//!
//! 영상 URL에서 video ID를 뽑고, 여러 수집 전략(`CaptionStrategy`)을 순서대로 시도해
//! 자막 텍스트를 얻습니다.
//!
//! 전략 순서:
//! 1. `CaptionTrackStrategy`: watch 페이지의 `captionTracks`에서 timed-text XML을 직접 받음
//! 2. `YtDlpStrategy`: 로컬 `yt-dlp` 바이너리로 자막 URL을 얻음 (개발 모드에서만 등록)
//!
//! 모든 전략이 실패하면 `None`을 돌려주고, 호출 측(라우트)이 400 응답으로 바꿉니다.

pub mod captions;
pub mod playlist;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;

use crate::{config::Config, models::Transcript};

pub use playlist::PlaylistResolver;

const WATCH_URL: &str = "https://www.youtube.com/watch";
const DEFAULT_YTDLP: &str = "yt-dlp";

static VIDEO_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:youtube\.com/watch\?v=|youtu\.be/)([^&\n?#]+)",
        r"youtube\.com/embed/([^&\n?#]+)",
        r"youtube\.com/v/([^&\n?#]+)",
        r"youtube\.com/shorts/([^&\n?#]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// 영상 URL에서 video ID를 추출합니다.
///
/// `watch?v=`, `youtu.be/`, `embed/`, `v/`, `shorts/` 형식을 인식합니다.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .map(|caps| caps[1].to_string())
}

/// URL의 `list` 쿼리 파라미터를 추출합니다.
pub fn extract_playlist_id(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "list")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}

/// 재생목록 링크인지 빠르게 판별합니다. 실제 ID는 `extract_playlist_id`로 꺼냅니다.
pub fn is_playlist(url: &str) -> bool {
    url.contains("list=")
}

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no caption tracks available")]
    NoCaptions,

    #[error("caption track was empty")]
    Empty,

    #[error("failed to run yt-dlp: {0}")]
    Io(#[from] std::io::Error),

    #[error("yt-dlp exited with an error: {0}")]
    YtDlp(String),

    #[error("invalid yt-dlp output: {0}")]
    Json(#[from] serde_json::Error),
}

/// 자막 하나를 가져오는 방법 하나.
#[async_trait]
pub trait CaptionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, video_id: &str) -> Result<Transcript, TranscriptError>;
}

/// watch 페이지에 실린 caption track 목록을 이용하는 기본 전략
pub struct CaptionTrackStrategy {
    client: reqwest::Client,
}

impl CaptionTrackStrategy {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CaptionStrategy for CaptionTrackStrategy {
    fn name(&self) -> &'static str {
        "caption-tracks"
    }

    async fn fetch(&self, video_id: &str) -> Result<Transcript, TranscriptError> {
        let html = self
            .client
            .get(WATCH_URL)
            .query(&[("v", video_id), ("hl", "en")])
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let tracks = captions::find_caption_tracks(&html).ok_or(TranscriptError::NoCaptions)?;
        let track = captions::select_track(&tracks).ok_or(TranscriptError::NoCaptions)?;
        tracing::debug!(video_id, lang = %track.language_code, "Selected caption track");

        let track_url = if track.base_url.starts_with('/') {
            format!("https://www.youtube.com{}", track.base_url)
        } else {
            track.base_url.clone()
        };

        let xml = self
            .client
            .get(&track_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let (text, duration) = captions::parse_timed_text(&xml).ok_or(TranscriptError::Empty)?;
        Ok(Transcript::new(video_id, text, duration))
    }
}

/// 로컬 `yt-dlp`로 자막 URL을 찾는 보조 전략
pub struct YtDlpStrategy {
    client: reqwest::Client,
    binary: String,
}

impl YtDlpStrategy {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            binary: DEFAULT_YTDLP.to_string(),
        }
    }
}

#[async_trait]
impl CaptionStrategy for YtDlpStrategy {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch(&self, video_id: &str) -> Result<Transcript, TranscriptError> {
        let url = format!("{}?v={}", WATCH_URL, video_id);
        let info = run_ytdlp(
            &self.binary,
            &[
                url.as_str(),
                "--dump-single-json",
                "--skip-download",
                "--no-warnings",
                "--no-check-certificate",
            ],
        )
        .await?;

        let caption_url = caption_url_from_info(&info).ok_or(TranscriptError::NoCaptions)?;
        let body = self
            .client
            .get(&caption_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let text = captions::normalize_caption_body(&body);
        if text.trim().is_empty() {
            return Err(TranscriptError::Empty);
        }

        Ok(Transcript::new(video_id, text, 0.0))
    }
}

/// yt-dlp 메타데이터에서 영어 자막 URL을 고릅니다.
///
/// 수동 자막(`subtitles.en`)을 먼저 보고, 없으면 자동 자막(`en`, `en-orig`)을 봅니다.
pub fn caption_url_from_info(info: &Value) -> Option<String> {
    let first_url = |v: Option<&Value>| {
        v.and_then(Value::as_array)
            .and_then(|formats| formats.first())
            .and_then(|f| f.get("url"))
            .and_then(Value::as_str)
            .map(String::from)
    };

    first_url(info.pointer("/subtitles/en"))
        .or_else(|| first_url(info.pointer("/automatic_captions/en")))
        .or_else(|| first_url(info.pointer("/automatic_captions/en-orig")))
}

/// yt-dlp를 실행하고 stdout을 JSON으로 파싱합니다.
pub(crate) async fn run_ytdlp(binary: &str, args: &[&str]) -> Result<Value, TranscriptError> {
    let output = Command::new(binary)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TranscriptError::YtDlp(stderr.trim().to_string()));
    }

    Ok(serde_json::from_slice(&output.stdout)?)
}

/// 등록된 전략을 순서대로 시도하는 자막 수집기
pub struct TranscriptExtractor {
    strategies: Vec<Box<dyn CaptionStrategy>>,
}

impl TranscriptExtractor {
    pub fn new(strategies: Vec<Box<dyn CaptionStrategy>>) -> Self {
        Self { strategies }
    }

    /// 설정에 맞춰 전략을 구성합니다.
    ///
    /// yt-dlp는 서버 환경에 없을 수 있으므로 개발 모드(`APP_ENV=development`)에서만 씁니다.
    pub fn from_config(client: reqwest::Client, config: &Config) -> Self {
        let mut strategies: Vec<Box<dyn CaptionStrategy>> =
            vec![Box::new(CaptionTrackStrategy::new(client.clone()))];

        if config.is_development() {
            strategies.push(Box::new(YtDlpStrategy::new(client)));
        } else {
            tracing::warn!("yt-dlp transcript fallback disabled outside development");
        }

        Self::new(strategies)
    }

    pub async fn get_video_transcript(&self, video_id: &str) -> Option<Transcript> {
        for strategy in &self.strategies {
            tracing::info!(video_id, strategy = strategy.name(), "Fetching transcript");

            match strategy.fetch(video_id).await {
                Ok(transcript) if !transcript.text.trim().is_empty() => {
                    tracing::info!(
                        video_id,
                        strategy = strategy.name(),
                        chars = transcript.text.len(),
                        "Transcript fetched"
                    );
                    return Some(transcript);
                }
                Ok(_) => {
                    tracing::warn!(video_id, strategy = strategy.name(), "Transcript was empty");
                }
                Err(e) => {
                    tracing::warn!(video_id, strategy = strategy.name(), error = %e, "Transcript strategy failed");
                }
            }
        }

        tracing::error!(video_id, "No transcript available");
        None
    }
}
