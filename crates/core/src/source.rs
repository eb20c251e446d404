//! Collaborator seams and their YouTube-backed implementations.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{ExtractionError, SearchError, TranscriptError},
    types::{TimedFragment, VideoCandidate},
};

/// Ranked video lookup for a topic string.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search(
        &self,
        topic: &str,
        max_results: u32,
    ) -> Result<Vec<VideoCandidate>, SearchError>;
}

/// Timed captions for a single video in a single language.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn get(
        &self,
        video_id: &str,
        language: &str,
    ) -> Result<Vec<TimedFragment>, TranscriptError>;
}

/// Text-understanding service. The returned text carries no structural guarantee.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ExtractionError>;
}

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const TIMED_TEXT_URL: &str = "https://www.youtube.com/api/timedtext";
const ASR_KIND: &str = "asr";
pub const YOUTUBE_API_KEY_ENV: &str = "YOUTUBE_API_KEY";

pub struct YoutubeSearch {
    http: reqwest::Client,
    api_key: String,
}

impl YoutubeSearch {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    pub fn from_env() -> Result<Self, SearchError> {
        let api_key =
            std::env::var(YOUTUBE_API_KEY_ENV).map_err(|_| SearchError::MissingApiKey {
                env_var: YOUTUBE_API_KEY_ENV.to_string(),
            })?;
        Ok(Self::new(api_key))
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: SearchSnippet,
}

#[derive(Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct SearchSnippet {
    title: String,
}

pub(crate) fn parse_search_response(body: &str) -> Result<Vec<VideoCandidate>, SearchError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| SearchError::InvalidResponse {
            reason: e.to_string(),
        })?;

    Ok(response
        .items
        .into_iter()
        .filter_map(|item| {
            item.id
                .video_id
                .map(|id| VideoCandidate::new(id, item.snippet.title))
        })
        .collect())
}

#[async_trait]
impl VideoSearch for YoutubeSearch {
    async fn search(
        &self,
        topic: &str,
        max_results: u32,
    ) -> Result<Vec<VideoCandidate>, SearchError> {
        let max_results = max_results.to_string();
        let response = self
            .http
            .get(SEARCH_URL)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("q", topic),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let candidates = parse_search_response(&body)?;
        debug!(topic, found = candidates.len(), "youtube search finished");
        Ok(candidates)
    }
}

/// Reads captions from the public timed-text endpoint in `json3` format.
///
/// Only the exact requested language is tried: the uploaded track, then the
/// auto-generated (`kind=asr`) one. There is no fallback to other languages
/// or auto-translated tracks.
pub struct YoutubeTimedText {
    http: reqwest::Client,
    base_url: String,
}

impl Default for YoutubeTimedText {
    fn default() -> Self {
        Self::new(TIMED_TEXT_URL)
    }
}

impl YoutubeTimedText {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Deserialize)]
struct TimedTextBody {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Deserialize)]
struct TimedTextEvent {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: u64,
    segs: Option<Vec<TimedTextSeg>>,
}

#[derive(Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

/// `Ok(None)` means the body carried no caption track at all.
pub(crate) fn parse_timed_text(body: &str) -> Result<Option<Vec<TimedFragment>>, String> {
    if body.trim().is_empty() {
        return Ok(None);
    }

    let parsed: TimedTextBody = serde_json::from_str(body).map_err(|e| e.to_string())?;
    let fragments: Vec<TimedFragment> = parsed
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs?.into_iter().map(|seg| seg.utf8).collect();
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(TimedFragment {
                text: text.to_string(),
                start_seconds: event.start_ms as f64 / 1000.0,
                duration_seconds: event.duration_ms as f64 / 1000.0,
            })
        })
        .collect();

    if fragments.is_empty() {
        Ok(None)
    } else {
        Ok(Some(fragments))
    }
}

impl YoutubeTimedText {
    /// One track request. `Ok(None)` means the track does not exist.
    async fn fetch_track(
        &self,
        video_id: &str,
        language: &str,
        kind: Option<&str>,
    ) -> Result<Option<Vec<TimedFragment>>, String> {
        let mut query = vec![("v", video_id), ("lang", language), ("fmt", "json3")];
        if let Some(kind) = kind {
            query.push(("kind", kind));
        }

        let response = self
            .http
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err("rate limited".to_string());
        }
        if !status.is_success() {
            return Err(format!("unexpected status {}", status));
        }

        let body = response.text().await.map_err(|e| e.to_string())?;
        parse_timed_text(&body).map_err(|reason| format!("unreadable caption body: {}", reason))
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTimedText {
    /// Uploaded captions first, then auto-generated ones, both in `language`.
    async fn get(
        &self,
        video_id: &str,
        language: &str,
    ) -> Result<Vec<TimedFragment>, TranscriptError> {
        let fetch_error = |reason: String| TranscriptError::Fetch {
            video_id: video_id.to_string(),
            reason,
        };

        for kind in [None, Some(ASR_KIND)] {
            let track = self
                .fetch_track(video_id, language, kind)
                .await
                .map_err(fetch_error)?;
            if let Some(fragments) = track {
                return Ok(fragments);
            }
            debug!(video_id, language, kind = kind.unwrap_or("manual"), "caption track missing");
        }

        Err(TranscriptError::NoTranscript {
            video_id: video_id.to_string(),
            language: language.to_string(),
        })
    }
}
