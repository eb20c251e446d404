use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("Search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Search API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid search response: {reason}")]
    InvalidResponse { reason: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranscriptError {
    #[error("No {language} transcript available for video {video_id}")]
    NoTranscript { video_id: String, language: String },

    #[error("Transcript fetch failed for video {video_id}: {reason}")]
    Fetch { video_id: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Extraction request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Extraction API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid API response: {reason}")]
    MissingContent { reason: String },
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to parse extraction response: {0}")]
    Parse(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

#[derive(Error, Debug)]
pub enum VidseekError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type Result<T> = std::result::Result<T, VidseekError>;
