use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::source::ExtractionService;

/// Free-text query to a single search topic. Always produces something usable.
#[async_trait]
pub trait TopicExtractor: Send + Sync {
    async fn extract(&self, query: &str) -> String;
}

fn topic_prompt(query: &str) -> String {
    format!(
        r#"Your tasks are the following:
0. Read the user's query: {query}
1. Identify and extract the principal main topic of the user's query (NOTE: THERE CAN ONLY BE ONE PRINCIPAL/MAIN TOPIC)
2. Check if the user's query is inappropriate or nonsense input.
3. Return the main topic only, as standalone text, without any other text.
4. DO NOT include anything other than the main topic: NO SYMBOLS, NO DECORATORS, NO CURLY BRACKETS."#
    )
}

/// Trim whitespace and wrapping quotes from a model-produced topic.
fn clean_topic(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`'))
        .trim()
}

pub struct ChatTopicExtractor {
    service: Arc<dyn ExtractionService>,
}

impl ChatTopicExtractor {
    pub fn new(service: Arc<dyn ExtractionService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl TopicExtractor for ChatTopicExtractor {
    async fn extract(&self, query: &str) -> String {
        match self.service.complete(&topic_prompt(query)).await {
            Ok(raw) => {
                let topic = clean_topic(&raw);
                if topic.is_empty() {
                    warn!(query, "topic extraction returned nothing, searching with raw query");
                    query.trim().to_string()
                } else {
                    info!(query, topic, "main topic extracted");
                    topic.to_string()
                }
            }
            Err(e) => {
                warn!(query, error = %e, "topic extraction failed, searching with raw query");
                query.trim().to_string()
            }
        }
    }
}
