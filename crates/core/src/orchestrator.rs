//! Concurrent fetch-and-analyze over a fixed batch of candidate videos.
//!
//! Every candidate gets its own spawned unit. Units share nothing mutable:
//! the fetcher and analyzer are read-only behind `Arc`, and each unit's
//! outcome lands in the slot matching its candidate's input position.
//! A unit that fails, times out or panics turns into a non-success
//! [`AnalysisOutcome`] and never disturbs its siblings.

use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::{
    analyzer::VideoAnalyzer,
    assemble::assemble,
    cache::TranscriptStore,
    config::PipelineConfig,
    error::{AnalysisError, TranscriptError},
    source::{ExtractionService, TranscriptSource},
    transcript::TranscriptFetcher,
    types::{AnalysisOutcome, SearchResult, VideoCandidate},
};

pub struct PipelineOrchestrator {
    fetcher: Arc<TranscriptFetcher>,
    analyzer: Arc<VideoAnalyzer>,
    unit_timeout: Option<Duration>,
}

impl PipelineOrchestrator {
    pub fn new(fetcher: TranscriptFetcher, analyzer: VideoAnalyzer) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            analyzer: Arc::new(analyzer),
            unit_timeout: None,
        }
    }

    pub fn from_config(
        source: Arc<dyn TranscriptSource>,
        service: Arc<dyn ExtractionService>,
        config: &PipelineConfig,
    ) -> Self {
        let mut fetcher = TranscriptFetcher::new(source, config.language.clone());
        if let Some(dir) = &config.transcripts_dir {
            fetcher = fetcher.with_store(TranscriptStore::new(dir));
        }

        let orchestrator = Self::new(fetcher, VideoAnalyzer::new(service));
        match config.unit_timeout {
            Some(limit) => orchestrator.with_unit_timeout(limit),
            None => orchestrator,
        }
    }

    /// Bound each unit separately. A unit that overruns becomes `FetchError("timeout")`.
    pub fn with_unit_timeout(mut self, limit: Duration) -> Self {
        self.unit_timeout = Some(limit);
        self
    }

    /// Process all candidates concurrently and wait for every one of them.
    ///
    /// The result has exactly one outcome per candidate, in input order,
    /// whatever order the units finish in.
    pub async fn run(&self, candidates: &[VideoCandidate], query: &str) -> Vec<AnalysisOutcome> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", %run_id, videos = candidates.len());

        async {
            let query: Arc<str> = Arc::from(query);

            let units: Vec<_> = candidates
                .iter()
                .map(|video| {
                    let fetcher = Arc::clone(&self.fetcher);
                    let analyzer = Arc::clone(&self.analyzer);
                    let video = video.clone();
                    let query = Arc::clone(&query);
                    let timeout = self.unit_timeout;
                    let unit_span = info_span!("video", video_id = %video.id);

                    tokio::spawn(
                        async move { run_unit(&fetcher, &analyzer, &video, &query, timeout).await }
                            .instrument(unit_span),
                    )
                })
                .collect();

            let outcomes: Vec<AnalysisOutcome> = join_all(units)
                .await
                .into_iter()
                .zip(candidates)
                .map(|(joined, video)| {
                    joined.unwrap_or_else(|e| {
                        warn!(video_id = %video.id, error = %e, "video worker did not complete");
                        AnalysisOutcome::FetchError(format!("worker failed: {}", e))
                    })
                })
                .collect();

            let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
            info!(
                succeeded,
                skipped = outcomes.len() - succeeded,
                "all videos processed"
            );

            outcomes
        }
        .instrument(span)
        .await
    }

    /// Run the batch and flatten successful analyses into search results.
    pub async fn collect(&self, candidates: &[VideoCandidate], query: &str) -> Vec<SearchResult> {
        let outcomes = self.run(candidates, query).await;
        assemble(candidates, &outcomes)
    }
}

async fn run_unit(
    fetcher: &TranscriptFetcher,
    analyzer: &VideoAnalyzer,
    video: &VideoCandidate,
    query: &str,
    timeout: Option<Duration>,
) -> AnalysisOutcome {
    let work = process_video(fetcher, analyzer, video, query);

    let Some(limit) = timeout else {
        return work.await;
    };

    match tokio::time::timeout(limit, work).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(title = %video.title, timeout_ms = limit.as_millis() as u64, "video timed out");
            AnalysisOutcome::FetchError("timeout".to_string())
        }
    }
}

/// Fetching -> Analyzing -> Succeeded, with a terminal failure at either step.
async fn process_video(
    fetcher: &TranscriptFetcher,
    analyzer: &VideoAnalyzer,
    video: &VideoCandidate,
    query: &str,
) -> AnalysisOutcome {
    let document = match fetcher.fetch(video).await {
        Ok(document) => document,
        Err(TranscriptError::NoTranscript { language, .. }) => {
            info!(title = %video.title, %language, "no transcript available, skipping");
            return AnalysisOutcome::NoTranscript;
        }
        Err(TranscriptError::Fetch { reason, .. }) => {
            warn!(title = %video.title, %reason, "transcript fetch failed, skipping");
            return AnalysisOutcome::FetchError(reason);
        }
    };

    match analyzer.analyze(&document, query).await {
        Ok(records) => {
            info!(title = %video.title, records = records.len(), "video analyzed");
            AnalysisOutcome::Success(records)
        }
        Err(AnalysisError::Parse(reason)) => {
            warn!(title = %video.title, %reason, "extraction response rejected, skipping");
            AnalysisOutcome::ParseError(reason)
        }
        Err(AnalysisError::Extraction(e)) => {
            warn!(title = %video.title, error = %e, "extraction request failed, skipping");
            AnalysisOutcome::FetchError(e.to_string())
        }
    }
}
