use crate::{
    format::timestamp_link,
    types::{AnalysisOutcome, SearchResult, VideoCandidate},
};

/// Flatten per-video outcomes into one result list.
///
/// Results are grouped by candidate in input order, and keep the extraction
/// order within a candidate. Anything other than `Success` contributes nothing.
pub fn assemble(candidates: &[VideoCandidate], outcomes: &[AnalysisOutcome]) -> Vec<SearchResult> {
    debug_assert_eq!(candidates.len(), outcomes.len());

    candidates
        .iter()
        .zip(outcomes)
        .flat_map(|(video, outcome)| {
            let records = match outcome {
                AnalysisOutcome::Success(records) => records.as_slice(),
                _ => &[][..],
            };
            let video_url = video.url();

            records.iter().map(move |info| SearchResult {
                video_url: video_url.clone(),
                title: info.title.clone(),
                description: info.description.clone(),
                text: info.excerpt_text.clone(),
                timestamp_url: timestamp_link(&video.id, info.start_time),
            })
        })
        .collect()
}
