use crate::{
    core::chunker::Chunk,
    error::{Result, SplitterError},
    progress::{emit_job_progress, JobProgress},
    tools::{SeparationEngine, UNKNOWN_DIAGNOSTIC},
    types::StemProfile,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Markers that tell us the engine produced an actual diagnostic rather
/// than dying silently.
const ERROR_MARKERS: [&str; 4] = ["error", "exception", "traceback", "killed"];

/// Runs the decomposition engine once per chunk, sequentially and in chunk
/// order. The first failing chunk aborts the whole job. Returns the
/// per-chunk separation directories, one per chunk, in chunk order.
pub fn separate_chunks(
    engine: &dyn SeparationEngine,
    job_id: &str,
    chunks: &[Chunk],
    profile: &StemProfile,
    separated_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(separated_dir)?;

    let model_id = profile.model_id();
    let mut chunk_dirs = Vec::with_capacity(chunks.len());

    for chunk in chunks {
        debug!(
            chunk = chunk.index,
            total = chunks.len(),
            model = %model_id,
            "separating chunk"
        );
        emit_job_progress(
            job_id,
            JobProgress::Separating {
                done: chunk.index,
                total: chunks.len(),
            },
        );

        if let Err(e) = engine.separate(&chunk.path, &model_id, separated_dir) {
            return Err(annotate_failure(e, chunk));
        }

        // Engines write each chunk's stems under a directory named after
        // the chunk file.
        chunk_dirs.push(separated_dir.join(chunk.base_name()));
    }

    Ok(chunk_dirs)
}

/// Keeps the engine's diagnostic verbatim, appending a heuristic hint only
/// when the text carries no recognizable error marker. Crashed or
/// OOM-killed engines often exit with nothing useful on stderr.
fn annotate_failure(err: SplitterError, chunk: &Chunk) -> SplitterError {
    let text = match err {
        SplitterError::Separation(text) => text,
        other => return other,
    };

    let lower = text.to_lowercase();
    let informative =
        text != UNKNOWN_DIAGNOSTIC && ERROR_MARKERS.iter().any(|m| lower.contains(m));

    let message = if informative {
        format!("chunk {}: {}", chunk.base_name(), text)
    } else {
        warn!(chunk = chunk.index, "engine exited without a usable diagnostic");
        format!(
            "chunk {}: {} (the engine exited without a recognizable diagnostic; \
             it may have run out of memory or been terminated externally)",
            chunk.base_name(),
            text
        )
    };

    SplitterError::Separation(message)
}
