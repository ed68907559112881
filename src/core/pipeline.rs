use crate::{
    core::{chunker, merger, separator},
    error::Result,
    paths::JobDirs,
    progress::{emit_job_progress, JobProgress},
    tools::{SeparationEngine, Transcoder},
    types::StemProfile,
};
use std::path::Path;
use tracing::info;

/// What a finished pipeline run leaves behind.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    /// Folder under the job's output directory holding the merged stems.
    pub track_folder: String,
    /// Merged stem file names, in stem order.
    pub files: Vec<String>,
}

/// Drives split -> separate -> merge for one job. Chunk order is preserved
/// end-to-end by the zero-padded segment numbering.
pub fn run(
    transcoder: &dyn Transcoder,
    engine: &dyn SeparationEngine,
    job_id: &str,
    input: &Path,
    profile: &StemProfile,
    chunk_secs: u32,
    dirs: &JobDirs,
) -> Result<PipelineOutput> {
    let track_folder = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("track")
        .to_string();

    emit_job_progress(job_id, JobProgress::Chunking);
    let chunks = chunker::split_track(transcoder, input, chunk_secs, &dirs.chunks)?;
    info!(job = job_id, chunks = chunks.len(), "input segmented");

    let chunk_dirs = separator::separate_chunks(engine, job_id, &chunks, profile, &dirs.separated)?;

    emit_job_progress(job_id, JobProgress::Merging);
    let final_dir = dirs.output.join(&track_folder);
    let files = merger::merge_stems(transcoder, &chunk_dirs, profile, &dirs.separated, &final_dir)?;
    info!(job = job_id, stems = files.len(), "stems merged");

    emit_job_progress(job_id, JobProgress::Finished);
    Ok(PipelineOutput {
        track_folder,
        files,
    })
}
