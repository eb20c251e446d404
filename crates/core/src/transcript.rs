use std::sync::Arc;

use tracing::debug;

use crate::{
    cache::TranscriptStore,
    error::TranscriptError,
    format::format_fragments,
    source::TranscriptSource,
    types::{TranscriptDocument, VideoCandidate},
};

/// Turns timed captions into a single offset-annotated text blob.
pub struct TranscriptFetcher {
    source: Arc<dyn TranscriptSource>,
    language: String,
    store: Option<TranscriptStore>,
}

impl TranscriptFetcher {
    pub fn new(source: Arc<dyn TranscriptSource>, language: impl Into<String>) -> Self {
        Self {
            source,
            language: language.into(),
            store: None,
        }
    }

    pub fn with_store(mut self, store: TranscriptStore) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn fetch(&self, video: &VideoCandidate) -> Result<TranscriptDocument, TranscriptError> {
        let fragments = self.source.get(&video.id, &self.language).await?;
        if fragments.is_empty() {
            return Err(TranscriptError::NoTranscript {
                video_id: video.id.clone(),
                language: self.language.clone(),
            });
        }

        let document = TranscriptDocument {
            video: video.clone(),
            text: format_fragments(&fragments),
        };
        debug!(
            video_id = %video.id,
            fragments = fragments.len(),
            chars = document.text.len(),
            "transcript fetched"
        );

        if let Some(store) = &self.store {
            store.save(&document).await;
        }

        Ok(document)
    }
}
