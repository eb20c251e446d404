use std::sync::Arc;

use tracing::info;

use crate::{
    config::PipelineConfig,
    error::{Result, SearchError},
    orchestrator::PipelineOrchestrator,
    provider::Provider,
    source::{VideoSearch, YoutubeSearch, YoutubeTimedText},
    topic::{ChatTopicExtractor, TopicExtractor},
    types::SearchResult,
};

/// Query in, timestamped excerpts out: topic, search, then the per-video pipeline.
pub struct SearchEngine {
    topics: Arc<dyn TopicExtractor>,
    videos: Arc<dyn VideoSearch>,
    orchestrator: PipelineOrchestrator,
    max_results: u32,
}

impl SearchEngine {
    pub fn new(
        topics: Arc<dyn TopicExtractor>,
        videos: Arc<dyn VideoSearch>,
        orchestrator: PipelineOrchestrator,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            topics,
            videos,
            orchestrator,
            max_results: config.max_results,
        }
    }

    /// Wire the YouTube collaborators and the provider's chat models.
    /// Fails early when an API key is missing.
    pub fn from_provider(provider: &Provider, config: &PipelineConfig) -> Result<Self> {
        let topics = ChatTopicExtractor::new(Arc::new(provider.topic_client()?));
        let videos = YoutubeSearch::from_env()?;
        let orchestrator = PipelineOrchestrator::from_config(
            Arc::new(YoutubeTimedText::default()),
            Arc::new(provider.analysis_client()?),
            config,
        );

        Ok(Self::new(
            Arc::new(topics),
            Arc::new(videos),
            orchestrator,
            config,
        ))
    }

    /// Only a failed video search is fatal; per-video problems shorten the list instead.
    pub async fn search(
        &self,
        query: &str,
    ) -> std::result::Result<Vec<SearchResult>, SearchError> {
        let topic = self.topics.extract(query).await;
        let candidates = self.videos.search(&topic, self.max_results).await?;

        if candidates.is_empty() {
            info!(%topic, "no videos found");
            return Ok(Vec::new());
        }

        for video in &candidates {
            info!(video_id = %video.id, title = %video.title, "candidate video");
        }

        Ok(self.orchestrator.collect(&candidates, query).await)
    }
}
