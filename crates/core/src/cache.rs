use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::types::TranscriptDocument;

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("vidseek")
}

/// Default location for diagnostic transcript dumps
pub fn get_transcripts_dir() -> PathBuf {
    get_root_cache_dir().join("transcripts")
}

/// Replace characters that are not allowed in file names on common filesystems
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

/// Get the path for a saved transcript, keyed by the video title
pub fn get_transcript_path(dir: &Path, title: &str) -> PathBuf {
    dir.join(format!("{}.txt", sanitize_filename(title)))
}

/// Best-effort transcript writer. Failures are logged and swallowed.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    dir: PathBuf,
}

impl TranscriptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn save(&self, document: &TranscriptDocument) {
        let path = get_transcript_path(&self.dir, &document.video.title);
        if let Err(e) = self.write(&path, document).await {
            warn!(
                video_id = %document.video.id,
                path = %path.display(),
                error = %e,
                "failed to save transcript"
            );
        } else {
            debug!(video_id = %document.video.id, path = %path.display(), "transcript saved");
        }
    }

    async fn write(&self, path: &Path, document: &TranscriptDocument) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let contents = format!("Video URL: {}\n\n{}", document.video.url(), document.text);
        fs::write(path, contents).await
    }
}
