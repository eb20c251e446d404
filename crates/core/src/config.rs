use std::{path::PathBuf, time::Duration};

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_MAX_RESULTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Caption language requested for every video. No fallback is attempted.
    pub language: String,
    /// Number of candidate videos requested from search.
    pub max_results: u32,
    /// Applied to each video independently, never to the whole batch.
    pub unit_timeout: Option<Duration>,
    /// When set, raw transcripts are written here for diagnostics.
    pub transcripts_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            unit_timeout: None,
            transcripts_dir: None,
        }
    }
}

impl PipelineConfig {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_unit_timeout(mut self, timeout: Duration) -> Self {
        self.unit_timeout = Some(timeout);
        self
    }

    pub fn with_transcripts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.transcripts_dir = Some(dir.into());
        self
    }
}
