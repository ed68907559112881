//! Job orchestration: one detached worker per submitted job.
//!
//! Submission validates the input and the external tools synchronously,
//! writes a `Processing` record, then hands the pipeline to its own thread.
//! The worker is the only writer of its record, and it writes a terminal
//! status exactly once. Callers observe progress by polling the store.

use crate::{
    core::pipeline,
    error::{Result, SplitterError},
    paths::{records_dir, JobDirs},
    store::JobStore,
    tools::{FfmpegTranscoder, SeparationEngine, SpleeterEngine, Transcoder},
    types::{JobPatch, JobRecord, SplitterConfig, StemProfile, SUPPORTED_EXTENSIONS},
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::Duration,
};
use tracing::{error, info};
use uuid::Uuid;

pub struct JobManager {
    config: SplitterConfig,
    store: Arc<JobStore>,
    transcoder: Arc<dyn Transcoder>,
    engine: Arc<dyn SeparationEngine>,
}

impl JobManager {
    /// Manager wired to the real external tools named in `config`.
    pub fn new(config: SplitterConfig) -> Self {
        let transcoder = Arc::new(FfmpegTranscoder::new(config.ffmpeg_bin.clone()));
        let engine = Arc::new(SpleeterEngine::new(config.python_bin.clone()));
        Self::with_tools(config, transcoder, engine)
    }

    /// Manager with injected tool implementations (used by tests).
    pub fn with_tools(
        config: SplitterConfig,
        transcoder: Arc<dyn Transcoder>,
        engine: Arc<dyn SeparationEngine>,
    ) -> Self {
        let store = Arc::new(JobStore::open(&records_dir(&config)));
        Self {
            config,
            store,
            transcoder,
            engine,
        }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// Submits a track for separation and returns the job id immediately.
    ///
    /// Tool availability and input validation happen here, synchronously,
    /// before any record exists. Everything after this call fails into the
    /// job's error field instead of surfacing to the caller.
    pub fn submit(&self, input: &Path, requested_stems: u8) -> Result<String> {
        self.transcoder.check()?;
        self.engine.check()?;

        let ext = input
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(SplitterError::InvalidInput(format!(
                "unsupported input type `{}` (expected one of: {})",
                input.display(),
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        }
        if !input.is_file() {
            return Err(SplitterError::InvalidInput(format!(
                "input file not found: {}",
                input.display()
            )));
        }

        let profile = StemProfile::resolve(requested_stems, &self.config);
        let job_id = new_job_id();

        self.store
            .create(JobRecord::new(job_id.clone(), profile.stems))?;
        info!(job = %job_id, stems = profile.stems, input = %input.display(), "job submitted");

        let store = Arc::clone(&self.store);
        let transcoder = Arc::clone(&self.transcoder);
        let engine = Arc::clone(&self.engine);
        let config = self.config.clone();
        let input = input.to_path_buf();
        let id = job_id.clone();

        thread::spawn(move || {
            run_job(&store, &*transcoder, &*engine, &config, &id, &input, &profile);
        });

        Ok(job_id)
    }

    /// Current record for `id`, or `RecordNotFound`.
    pub fn status(&self, id: &str) -> Result<JobRecord> {
        self.store.get(id)
    }

    /// Polls until the job reaches a terminal status.
    pub fn wait(&self, id: &str, poll_interval: Duration) -> Result<JobRecord> {
        loop {
            let record = self.store.get(id)?;
            if record.status.is_terminal() {
                return Ok(record);
            }
            thread::sleep(poll_interval);
        }
    }

    /// Resolves a downloadable output file, rejecting anything that does
    /// not point at an existing `.wav` inside the job's output directory.
    pub fn resolve_output(&self, id: &str, track_folder: &str, file_name: &str) -> Result<PathBuf> {
        for component in [id, track_folder, file_name] {
            if component.is_empty()
                || component.contains('/')
                || component.contains('\\')
                || component.contains("..")
            {
                return Err(SplitterError::InvalidInput(format!(
                    "invalid path component `{component}`"
                )));
            }
        }
        if !file_name.to_lowercase().ends_with(".wav") {
            return Err(SplitterError::InvalidInput(format!(
                "not a waveform file: {file_name}"
            )));
        }

        let path = JobDirs::new(&self.config, id)
            .output
            .join(track_folder)
            .join(file_name);
        if !path.is_file() {
            return Err(SplitterError::InvalidInput(format!(
                "file not found: {file_name}"
            )));
        }
        Ok(path)
    }
}

/// Worker body. Exactly one terminal transition is written per job; a
/// pipeline that claims success with an empty manifest is treated as a
/// silent engine failure.
fn run_job(
    store: &JobStore,
    transcoder: &dyn Transcoder,
    engine: &dyn SeparationEngine,
    config: &SplitterConfig,
    job_id: &str,
    input: &Path,
    profile: &StemProfile,
) {
    let dirs = JobDirs::new(config, job_id);
    let result = pipeline::run(
        transcoder,
        engine,
        job_id,
        input,
        profile,
        config.chunk_secs,
        &dirs,
    );

    let patch = match result {
        Ok(out) if out.files.is_empty() => {
            error!(job = job_id, "pipeline succeeded but produced no outputs");
            JobPatch::error(SplitterError::OutputMissing.to_string())
        }
        Ok(out) => {
            info!(job = job_id, files = out.files.len(), "job done");
            JobPatch::done(out.track_folder, out.files)
        }
        Err(e) => {
            error!(job = job_id, error = %e, "job failed");
            JobPatch::error(e.to_string())
        }
    };

    if let Err(e) = store.update(job_id, patch) {
        error!(job = job_id, error = %e, "failed to persist terminal status");
    }
}

/// Opaque 8-hex job id, unique per submission.
fn new_job_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
