use crate::{
    error::{Result, SplitterError},
    tools::Transcoder,
    types::StemProfile,
};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Joins the per-chunk fragments into one full-length waveform per stem.
///
/// `chunk_dirs` must be in chunk order; for every stem name each chunk
/// directory must hold exactly one fragment. Merging is fail-fast across
/// stems, and outputs already written for earlier stems stay on disk.
pub fn merge_stems(
    transcoder: &dyn Transcoder,
    chunk_dirs: &[PathBuf],
    profile: &StemProfile,
    scratch_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<String>> {
    fs::create_dir_all(scratch_dir)?;
    fs::create_dir_all(output_dir)?;

    let mut files = Vec::with_capacity(profile.names.len());

    for stem in profile.names {
        let fragments = collect_fragments(chunk_dirs, stem)?;
        let manifest = write_concat_manifest(scratch_dir, stem, &fragments)?;

        let file_name = format!("{stem}.wav");
        let merged = output_dir.join(&file_name);
        transcoder.concat(&manifest, &merged)?;

        debug!(stem, fragments = fragments.len(), out = %merged.display(), "stem merged");
        files.push(file_name);
    }

    Ok(files)
}

/// One fragment per chunk, in chunk order. A missing fragment names its
/// full path so the failing chunk/stem pair is identifiable.
fn collect_fragments(chunk_dirs: &[PathBuf], stem: &str) -> Result<Vec<PathBuf>> {
    let mut fragments = Vec::with_capacity(chunk_dirs.len());
    for dir in chunk_dirs {
        let fragment = dir.join(format!("{stem}.wav"));
        if !fragment.is_file() {
            return Err(SplitterError::Merge(format!(
                "missing fragment {}",
                fragment.display()
            )));
        }
        fragments.push(fragment);
    }
    Ok(fragments)
}

/// Concat-demuxer manifest: one `file '<path>'` line per fragment.
fn write_concat_manifest(scratch_dir: &Path, stem: &str, fragments: &[PathBuf]) -> Result<PathBuf> {
    let path = scratch_dir.join(format!("concat_{stem}.txt"));
    let mut f = fs::File::create(&path)?;
    for fragment in fragments {
        let escaped = fragment.display().to_string().replace('\'', r"'\''");
        writeln!(f, "file '{escaped}'")?;
    }
    Ok(path)
}
