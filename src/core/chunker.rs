use crate::{
    error::{Result, SplitterError},
    tools::Transcoder,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// One fixed-duration segment of the input track. Chunks exist only for the
/// lifetime of a single pipeline run.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub index: usize,
    pub path: PathBuf,
}

impl Chunk {
    /// File stem used as the name of the per-chunk separation directory.
    pub fn base_name(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("chunk")
    }
}

/// Splits `input` into stream-copied segments of at most `chunk_secs`
/// seconds under `chunk_dir`. The zero-padded segment number defines the
/// canonical chunk order for every downstream stage. The final segment may
/// be shorter than `chunk_secs`.
pub fn split_track(
    transcoder: &dyn Transcoder,
    input: &Path,
    chunk_secs: u32,
    chunk_dir: &Path,
) -> Result<Vec<Chunk>> {
    fs::create_dir_all(chunk_dir)?;

    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mp3")
        .to_lowercase();
    let pattern = chunk_dir.join(format!("chunk_%03d.{ext}"));

    transcoder.segment(input, chunk_secs, &pattern)?;

    let mut paths: Vec<PathBuf> = fs::read_dir(chunk_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .collect();
    // The segment counter stops zero-padding past its width, so a plain
    // lexicographic sort would slot chunk_1000 before chunk_101. Order by
    // the numeric suffix instead.
    paths.sort_by_key(|p| (sequence_number(p), p.clone()));

    if paths.is_empty() {
        return Err(SplitterError::Chunking(
            "no chunks generated from input".into(),
        ));
    }

    debug!(chunks = paths.len(), dir = %chunk_dir.display(), "track segmented");

    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| Chunk { index, path })
        .collect())
}

/// Trailing digits of the file stem. Files without one sort last.
fn sequence_number(path: &Path) -> u64 {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|stem| stem.trim_start_matches(|c: char| !c.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(u64::MAX)
}
