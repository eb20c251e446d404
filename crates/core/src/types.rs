use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCandidate {
    pub id: String,
    pub title: String,
}

impl VideoCandidate {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }

    pub fn url(&self) -> String {
        crate::format::video_url(&self.id)
    }
}

/// One caption unit as emitted by a transcript source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedFragment {
    pub text: String,
    pub start_seconds: f64,
    pub duration_seconds: f64,
}

impl TimedFragment {
    pub fn end_seconds(&self) -> f64 {
        self.start_seconds + self.duration_seconds
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptDocument {
    pub video: VideoCandidate,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevantInformation {
    pub title: String,
    pub description: String,
    #[serde(rename = "text")]
    pub excerpt_text: String,
    pub start_time: f64,
    pub end_time: f64,
}

/// Terminal state of a single video's fetch-and-analyze unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Success(Vec<RelevantInformation>),
    NoTranscript,
    FetchError(String),
    ParseError(String),
}

impl AnalysisOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Success(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub video_url: String,
    pub title: String,
    pub description: String,
    pub text: String,
    pub timestamp_url: String,
}
