use crate::types::{SearchResult, TimedFragment};

const WATCH_URL: &str = "https://www.youtube.com/watch";

pub fn video_url(video_id: &str) -> String {
    format!("{}?v={}", WATCH_URL, video_id)
}

/// Deep link to `start_seconds` into the video. Fractional seconds are truncated.
pub fn timestamp_link(video_id: &str, start_seconds: f64) -> String {
    let start = start_seconds.max(0.0) as u64;
    format!("{}&t={}s", video_url(video_id), start)
}

/// One transcript line in the `"{start}s - {end}s: {text}"` marker format.
pub fn format_fragment(fragment: &TimedFragment) -> String {
    format!(
        "{:.2}s - {:.2}s: {}",
        fragment.start_seconds,
        fragment.end_seconds(),
        fragment.text.trim()
    )
}

pub fn format_fragments(fragments: &[TimedFragment]) -> String {
    fragments
        .iter()
        .map(format_fragment)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format search results as human-readable text, one block per excerpt
pub fn format_results_readable(results: &[SearchResult]) -> String {
    let mut output = String::new();
    let mut current_video: Option<&str> = None;

    for result in results {
        if current_video != Some(result.video_url.as_str()) {
            output.push_str(&format!("## {}\n\n", result.video_url));
            current_video = Some(result.video_url.as_str());
        }
        output.push_str(&format!("### {}\n\n", result.title));
        output.push_str(&format!("{}\n\n", result.description));
        output.push_str(&format!("> {}\n\n", result.text));
        output.push_str(&format!("Timestamp: {}\n\n", result.timestamp_url));
    }

    output
}
