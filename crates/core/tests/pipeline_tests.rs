use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use vidseek_core::{
    AnalysisOutcome, ExtractionError, ExtractionService, PipelineConfig, PipelineOrchestrator,
    SearchEngine, SearchError, TimedFragment, TopicExtractor, TranscriptError, TranscriptSource,
    VideoCandidate, VideoSearch,
};

const QUERY: &str = "how does the borrow checker work";

enum Captions {
    Ok(Vec<TimedFragment>),
    Err(TranscriptError),
    Panic,
}

/// Transcript source keyed by video id, with a per-video delay.
#[derive(Default)]
struct FakeTranscripts {
    videos: HashMap<String, (u64, Captions)>,
}

impl FakeTranscripts {
    fn with(mut self, id: &str, delay_ms: u64, captions: Captions) -> Self {
        self.videos.insert(id.to_string(), (delay_ms, captions));
        self
    }

    /// A single fragment whose text names the video, so the extraction fake can tell videos apart.
    fn with_captions(self, id: &str, delay_ms: u64) -> Self {
        self.with(
            id,
            delay_ms,
            Captions::Ok(vec![TimedFragment {
                text: format!("captions of {}", id),
                start_seconds: 0.0,
                duration_seconds: 5.0,
            }]),
        )
    }

    fn without_captions(self, id: &str) -> Self {
        self.with(
            id,
            0,
            Captions::Err(TranscriptError::NoTranscript {
                video_id: id.to_string(),
                language: "en".to_string(),
            }),
        )
    }
}

#[async_trait]
impl TranscriptSource for FakeTranscripts {
    async fn get(
        &self,
        video_id: &str,
        _language: &str,
    ) -> Result<Vec<TimedFragment>, TranscriptError> {
        let Some((delay_ms, captions)) = self.videos.get(video_id) else {
            return Err(TranscriptError::Fetch {
                video_id: video_id.to_string(),
                reason: "unknown video".to_string(),
            });
        };
        tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        match captions {
            Captions::Ok(fragments) => Ok(fragments.clone()),
            Captions::Err(e) => Err(e.clone()),
            Captions::Panic => panic!("caption backend exploded for {}", video_id),
        }
    }
}

/// Extraction service that answers based on which video's captions are in the prompt.
#[derive(Default)]
struct FakeExtraction {
    replies: HashMap<String, (u64, Option<String>)>,
    finished: Mutex<Vec<String>>,
}

impl FakeExtraction {
    fn reply(mut self, id: &str, delay_ms: u64, body: &str) -> Self {
        self.replies
            .insert(id.to_string(), (delay_ms, Some(body.to_string())));
        self
    }

    fn fail(mut self, id: &str) -> Self {
        self.replies.insert(id.to_string(), (0, None));
        self
    }

    fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExtractionService for FakeExtraction {
    async fn complete(&self, prompt: &str) -> Result<String, ExtractionError> {
        assert!(prompt.contains(QUERY), "prompt must carry the original query");

        let (id, (delay_ms, body)) = self
            .replies
            .iter()
            .find(|(id, _)| prompt.contains(&format!("captions of {}", id)))
            .expect("prompt for an unexpected video");

        tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        self.finished.lock().unwrap().push(id.clone());

        body.clone().ok_or_else(|| ExtractionError::Status {
            status: 503,
            body: "overloaded".to_string(),
        })
    }
}

fn records(prefix: &str, count: usize) -> String {
    let entries: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"title": "{prefix}-{i}", "description": "about {prefix}", "text": "excerpt {i}", "start_time": {start}, "end_time": {end}}}"#,
                start = i as f64 * 10.0 + 0.9,
                end = i as f64 * 10.0 + 8.0,
            )
        })
        .collect();
    format!(r#"{{"relevant_information": [{}]}}"#, entries.join(","))
}

fn candidates(ids: &[&str]) -> Vec<VideoCandidate> {
    ids.iter()
        .map(|id| VideoCandidate::new(*id, format!("Video {}", id)))
        .collect()
}

fn orchestrator(
    transcripts: FakeTranscripts,
    extraction: Arc<FakeExtraction>,
) -> PipelineOrchestrator {
    PipelineOrchestrator::from_config(
        Arc::new(transcripts),
        extraction,
        &PipelineConfig::default(),
    )
}

fn record_count(outcome: &AnalysisOutcome) -> Option<usize> {
    match outcome {
        AnalysisOutcome::Success(records) => Some(records.len()),
        _ => None,
    }
}

#[tokio::test]
async fn outcomes_keep_input_order_when_completion_order_differs() {
    let transcripts = FakeTranscripts::default()
        .with_captions("a", 0)
        .with_captions("b", 0)
        .with_captions("c", 0);
    let extraction = Arc::new(
        FakeExtraction::default()
            .reply("a", 150, &records("a", 1))
            .reply("b", 75, &records("b", 2))
            .reply("c", 0, &records("c", 3)),
    );

    let outcomes = orchestrator(transcripts, Arc::clone(&extraction))
        .run(&candidates(&["a", "b", "c"]), QUERY)
        .await;

    assert_eq!(extraction.finished(), ["c", "b", "a"]);
    assert_eq!(outcomes.len(), 3);
    let counts: Vec<_> = outcomes.iter().map(record_count).collect();
    assert_eq!(counts, [Some(1), Some(2), Some(3)]);
}

#[tokio::test]
async fn units_run_concurrently() {
    let transcripts = FakeTranscripts::default()
        .with_captions("a", 100)
        .with_captions("b", 100)
        .with_captions("c", 100);
    let extraction = Arc::new(
        FakeExtraction::default()
            .reply("a", 100, &records("a", 1))
            .reply("b", 100, &records("b", 1))
            .reply("c", 100, &records("c", 1)),
    );

    let started = std::time::Instant::now();
    let outcomes = orchestrator(transcripts, extraction)
        .run(&candidates(&["a", "b", "c"]), QUERY)
        .await;

    assert!(outcomes.iter().all(AnalysisOutcome::is_success));
    // sequential execution would take at least 600ms
    assert!(started.elapsed() < Duration::from_millis(550));
}

#[tokio::test]
async fn missing_transcript_is_skipped_without_touching_siblings() {
    let transcripts = FakeTranscripts::default()
        .without_captions("a")
        .with_captions("b", 10);
    let extraction = Arc::new(FakeExtraction::default().reply("b", 0, &records("b", 2)));

    let orchestrator = orchestrator(transcripts, Arc::clone(&extraction));
    let videos = candidates(&["a", "b"]);

    let outcomes = orchestrator.run(&videos, QUERY).await;
    assert_eq!(outcomes[0], AnalysisOutcome::NoTranscript);
    assert_eq!(record_count(&outcomes[1]), Some(2));

    let results = orchestrator.collect(&videos, QUERY).await;
    assert_eq!(results.len(), 2);
    assert!(
        results
            .iter()
            .all(|r| r.video_url == "https://www.youtube.com/watch?v=b")
    );
}

#[tokio::test]
async fn mixed_failures_leave_only_the_good_video() {
    let transcripts = FakeTranscripts::default()
        .without_captions("a")
        .with_captions("b", 0)
        .with_captions("c", 0);
    let extraction = Arc::new(
        FakeExtraction::default()
            .reply("b", 20, &records("b", 2))
            .reply("c", 0, r#"{"relevant_information": [{"title": "oops", "#),
    );

    let orchestrator = orchestrator(transcripts, extraction);
    let videos = candidates(&["a", "b", "c"]);

    let outcomes = orchestrator.run(&videos, QUERY).await;
    assert_eq!(outcomes[0], AnalysisOutcome::NoTranscript);
    assert!(outcomes[1].is_success());
    assert!(matches!(outcomes[2], AnalysisOutcome::ParseError(_)));

    let results = orchestrator.collect(&videos, QUERY).await;
    let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["b-0", "b-1"]);
    assert_eq!(
        results[0].timestamp_url,
        "https://www.youtube.com/watch?v=b&t=0s"
    );
    assert_eq!(
        results[1].timestamp_url,
        "https://www.youtube.com/watch?v=b&t=10s"
    );
}

#[tokio::test]
async fn all_successes_are_grouped_by_candidate() {
    let transcripts = FakeTranscripts::default()
        .with_captions("a", 30)
        .with_captions("b", 0)
        .with_captions("c", 15);
    let extraction = Arc::new(
        FakeExtraction::default()
            .reply("a", 0, &records("a", 2))
            .reply("b", 40, &records("b", 2))
            .reply("c", 0, &format!("```json\n{}\n```", records("c", 2))),
    );

    let results = orchestrator(transcripts, extraction)
        .collect(&candidates(&["a", "b", "c"]), QUERY)
        .await;

    let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["a-0", "a-1", "b-0", "b-1", "c-0", "c-1"]);
}

#[tokio::test]
async fn extraction_request_failure_is_a_fetch_error() {
    let transcripts = FakeTranscripts::default()
        .with_captions("a", 0)
        .with_captions("b", 0);
    let extraction = Arc::new(
        FakeExtraction::default()
            .fail("a")
            .reply("b", 0, &records("b", 1)),
    );

    let outcomes = orchestrator(transcripts, extraction)
        .run(&candidates(&["a", "b"]), QUERY)
        .await;

    assert!(matches!(&outcomes[0], AnalysisOutcome::FetchError(reason) if reason.contains("503")));
    assert!(outcomes[1].is_success());
}

#[tokio::test]
async fn timeout_applies_to_the_slow_unit_only() {
    let transcripts = FakeTranscripts::default()
        .with_captions("slow", 2_000)
        .with_captions("fast", 0);
    let extraction = Arc::new(
        FakeExtraction::default()
            .reply("slow", 0, &records("slow", 1))
            .reply("fast", 0, &records("fast", 1)),
    );

    let orchestrator = orchestrator(transcripts, extraction)
        .with_unit_timeout(Duration::from_millis(100));
    let outcomes = orchestrator
        .run(&candidates(&["slow", "fast"]), QUERY)
        .await;

    assert_eq!(outcomes[0], AnalysisOutcome::FetchError("timeout".to_string()));
    assert_eq!(record_count(&outcomes[1]), Some(1));
}

#[tokio::test]
async fn panicking_unit_does_not_abort_the_batch() {
    let transcripts = FakeTranscripts::default()
        .with("a", 0, Captions::Panic)
        .with_captions("b", 20);
    let extraction = Arc::new(FakeExtraction::default().reply("b", 0, &records("b", 2)));

    let outcomes = orchestrator(transcripts, extraction)
        .run(&candidates(&["a", "b"]), QUERY)
        .await;

    assert!(
        matches!(&outcomes[0], AnalysisOutcome::FetchError(reason) if reason.starts_with("worker failed"))
    );
    assert_eq!(record_count(&outcomes[1]), Some(2));
}

#[tokio::test]
async fn fetch_errors_carry_their_reason() {
    let transcripts = FakeTranscripts::default().with(
        "a",
        0,
        Captions::Err(TranscriptError::Fetch {
            video_id: "a".to_string(),
            reason: "rate limited".to_string(),
        }),
    );

    let outcomes = orchestrator(transcripts, Arc::new(FakeExtraction::default()))
        .run(&candidates(&["a"]), QUERY)
        .await;

    assert_eq!(
        outcomes,
        [AnalysisOutcome::FetchError("rate limited".to_string())]
    );
}

#[tokio::test]
async fn empty_batch_yields_no_outcomes() {
    let outcomes = orchestrator(FakeTranscripts::default(), Arc::new(FakeExtraction::default()))
        .run(&[], QUERY)
        .await;
    assert!(outcomes.is_empty());
}

struct FixedTopic;

#[async_trait]
impl TopicExtractor for FixedTopic {
    async fn extract(&self, query: &str) -> String {
        assert_eq!(query, QUERY);
        "borrow checker".to_string()
    }
}

struct FakeSearch(Result<Vec<VideoCandidate>, u16>);

#[async_trait]
impl VideoSearch for FakeSearch {
    async fn search(
        &self,
        topic: &str,
        max_results: u32,
    ) -> Result<Vec<VideoCandidate>, SearchError> {
        assert_eq!(topic, "borrow checker");
        assert_eq!(max_results, 3);
        self.0.clone().map_err(|status| SearchError::Status {
            status,
            body: "quota".to_string(),
        })
    }
}

fn engine(search: FakeSearch) -> SearchEngine {
    let transcripts = FakeTranscripts::default()
        .with_captions("a", 0)
        .without_captions("b");
    let extraction = Arc::new(FakeExtraction::default().reply("a", 0, &records("a", 2)));

    SearchEngine::new(
        Arc::new(FixedTopic),
        Arc::new(search),
        orchestrator(transcripts, extraction),
        &PipelineConfig::default(),
    )
}

#[tokio::test]
async fn engine_searches_by_topic_and_analyzes_by_query() {
    let results = engine(FakeSearch(Ok(candidates(&["a", "b"]))))
        .search(QUERY)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "a-0");
    assert_eq!(results[0].text, "excerpt 0");
    assert_eq!(results[0].description, "about a");
}

#[tokio::test]
async fn engine_without_candidates_returns_nothing() {
    let results = engine(FakeSearch(Ok(Vec::new())))
        .search(QUERY)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn engine_surfaces_search_failure() {
    let err = engine(FakeSearch(Err(403))).search(QUERY).await.unwrap_err();
    assert!(matches!(err, SearchError::Status { status: 403, .. }));
}
