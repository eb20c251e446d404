//! Vidseek Core Library
//!
//! Finds the passages of a few YouTube videos that answer a free-form query:
//! extract a topic, search for candidate videos, then fetch and analyze every
//! candidate's transcript concurrently into timestamped excerpts.

pub mod analyzer;
pub mod assemble;
pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod orchestrator;
pub mod pipeline;
pub mod provider;
pub mod source;
pub mod topic;
pub mod transcript;
pub mod types;

// Re-export commonly used items at crate root
pub use analyzer::{VideoAnalyzer, parse_relevant_information, strip_code_fence};
pub use assemble::assemble;
pub use cache::{TranscriptStore, get_transcripts_dir, sanitize_filename};
pub use config::PipelineConfig;
pub use error::{
    AnalysisError, ExtractionError, Result, SearchError, TranscriptError, VidseekError,
};
pub use format::{format_results_readable, timestamp_link, video_url};
pub use orchestrator::PipelineOrchestrator;
pub use pipeline::SearchEngine;
pub use provider::{ChatClient, Provider, ProviderConfig, ProviderError};
pub use source::{
    ExtractionService, TranscriptSource, VideoSearch, YoutubeSearch, YoutubeTimedText,
};
pub use topic::{ChatTopicExtractor, TopicExtractor};
pub use transcript::TranscriptFetcher;
pub use types::{
    AnalysisOutcome, RelevantInformation, SearchResult, TimedFragment, TranscriptDocument,
    VideoCandidate,
};
