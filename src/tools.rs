//! Seams for the external tools the pipeline shells out to.
//!
//! The transcoder (lossless split/join) and the decomposition engine are
//! trait objects so tests can substitute fakes without spawning processes.

use crate::error::{Result, SplitterError};
use std::{
    path::Path,
    process::{Command, Output, Stdio},
};

/// Lossless segmenting/concatenation transcoder.
pub trait Transcoder: Send + Sync {
    /// Returns an error if the tool is not invocable.
    fn check(&self) -> Result<()>;

    /// Splits `input` into stream-copied segments of at most `chunk_secs`
    /// seconds, numbered according to `out_pattern`.
    fn segment(&self, input: &Path, chunk_secs: u32, out_pattern: &Path) -> Result<()>;

    /// Joins the fragments listed in `manifest` (concat-demuxer format)
    /// into `output` without re-encoding.
    fn concat(&self, manifest: &Path, output: &Path) -> Result<()>;
}

/// External source-separation engine.
pub trait SeparationEngine: Send + Sync {
    /// Returns an error if the engine is not invocable.
    fn check(&self) -> Result<()>;

    /// Separates one chunk, writing one waveform per stem under
    /// `<out_dir>/<chunk base name>/`.
    fn separate(&self, chunk: &Path, model_id: &str, out_dir: &Path) -> Result<()>;
}

/// ffmpeg-backed `Transcoder`.
pub struct FfmpegTranscoder {
    bin: String,
}

impl FfmpegTranscoder {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Transcoder for FfmpegTranscoder {
    fn check(&self) -> Result<()> {
        let available = Command::new(&self.bin)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);

        if available {
            Ok(())
        } else {
            Err(SplitterError::DependencyMissing(format!(
                "ffmpeg (`{}`) was not found on PATH",
                self.bin
            )))
        }
    }

    fn segment(&self, input: &Path, chunk_secs: u32, out_pattern: &Path) -> Result<()> {
        let output = Command::new(&self.bin)
            .args(["-hide_banner", "-nostdin", "-y", "-i"])
            .arg(input)
            .args(["-f", "segment", "-segment_time"])
            .arg(chunk_secs.to_string())
            .args(["-c", "copy"])
            .arg(out_pattern)
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            Err(SplitterError::Chunking(diagnostic_text(&output)))
        }
    }

    fn concat(&self, manifest: &Path, output: &Path) -> Result<()> {
        let out = Command::new(&self.bin)
            .args(["-hide_banner", "-nostdin", "-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(manifest)
            .args(["-c", "copy"])
            .arg(output)
            .output()?;

        if out.status.success() {
            Ok(())
        } else {
            Err(SplitterError::Merge(diagnostic_text(&out)))
        }
    }
}

/// Spleeter CLI invoked through a Python interpreter, exactly like the
/// upstream tooling (`python -m spleeter separate ...`).
pub struct SpleeterEngine {
    python_bin: String,
}

impl SpleeterEngine {
    pub fn new(python_bin: impl Into<String>) -> Self {
        Self {
            python_bin: python_bin.into(),
        }
    }
}

impl SeparationEngine for SpleeterEngine {
    fn check(&self) -> Result<()> {
        let available = Command::new(&self.python_bin)
            .args(["-m", "spleeter", "--help"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);

        if available {
            Ok(())
        } else {
            Err(SplitterError::DependencyMissing(format!(
                "Spleeter is not installed in this Python environment: {}",
                self.python_bin
            )))
        }
    }

    fn separate(&self, chunk: &Path, model_id: &str, out_dir: &Path) -> Result<()> {
        let output = Command::new(&self.python_bin)
            .args(["-m", "spleeter", "separate", "-p", model_id, "-o"])
            .arg(out_dir)
            .arg(chunk)
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            Err(SplitterError::Separation(diagnostic_text(&output)))
        }
    }
}

/// Fallback diagnostic when a tool exits nonzero with nothing on either
/// stream.
pub const UNKNOWN_DIAGNOSTIC: &str = "Unknown error";

/// Prefers stderr over stdout, falling back to a fixed message when the tool
/// died silently.
fn diagnostic_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let text = if !stderr.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };
    if text.is_empty() {
        UNKNOWN_DIAGNOSTIC.to_string()
    } else {
        text.to_string()
    }
}
