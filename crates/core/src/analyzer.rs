use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{AnalysisError, ExtractionError},
    source::ExtractionService,
    types::{RelevantInformation, TranscriptDocument},
};

fn analysis_prompt(query: &str, transcript: &str) -> String {
    format!(
        r#"Analyze the following transcript and extract the most relevant information related to the query '{query}'.
Provide timestamps where this information can be found. Each transcript line starts with "<start>s - <end>s:".

Return ONLY valid JSON with this structure, ideally with 2 entries:
{{
  "relevant_information": [
    {{
      "title": "Short title",
      "description": "What this passage covers and why it answers the query",
      "text": "The relevant transcript text",
      "start_time": 12.5,
      "end_time": 48.0
    }}
  ]
}}

start_time and end_time are numbers of seconds taken from the transcript markers.

Transcript:
{transcript}"#
    )
}

#[derive(Deserialize)]
struct ExtractionPayload {
    relevant_information: Vec<RelevantInformation>,
}

/// Remove a surrounding markdown code fence (with optional language tag).
/// Text without a fence is returned trimmed and otherwise untouched.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest
            .trim_start()
            .trim_start_matches(|c: char| c.is_ascii_alphanumeric());
        text = rest.trim_start();
        if let Some(inner) = text.strip_suffix("```") {
            text = inner;
        }
    }

    text.trim()
}

/// Strict parse of the extraction response into validated records.
pub fn parse_relevant_information(raw: &str) -> Result<Vec<RelevantInformation>, AnalysisError> {
    let payload: ExtractionPayload = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| AnalysisError::Parse(e.to_string()))?;

    for (i, info) in payload.relevant_information.iter().enumerate() {
        if !info.start_time.is_finite() || info.start_time < 0.0 {
            return Err(AnalysisError::Parse(format!(
                "entry {} has invalid start_time {}",
                i, info.start_time
            )));
        }
        if !info.end_time.is_finite() || info.end_time < info.start_time {
            return Err(AnalysisError::Parse(format!(
                "entry {} ends at {} before it starts at {}",
                i, info.end_time, info.start_time
            )));
        }
    }

    Ok(payload.relevant_information)
}

pub struct VideoAnalyzer {
    service: Arc<dyn ExtractionService>,
}

impl VideoAnalyzer {
    pub fn new(service: Arc<dyn ExtractionService>) -> Self {
        Self { service }
    }

    pub async fn analyze(
        &self,
        document: &TranscriptDocument,
        query: &str,
    ) -> Result<Vec<RelevantInformation>, AnalysisError> {
        let prompt = analysis_prompt(query, &document.text);
        let raw = match self.service.complete(&prompt).await {
            Ok(raw) => raw,
            // a reply without any text is as uninterpretable as malformed text
            Err(ExtractionError::MissingContent { reason }) => {
                return Err(AnalysisError::Parse(reason));
            }
            Err(e) => return Err(e.into()),
        };

        let records = parse_relevant_information(&raw).inspect_err(|e| {
            debug!(video_id = %document.video.id, response = %raw, error = %e, "unparsable extraction response");
        })?;

        debug!(video_id = %document.video.id, records = records.len(), "transcript analyzed");
        Ok(records)
    }
}
