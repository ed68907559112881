use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle of a submitted job. A record starts as `Processing` and moves
/// exactly once to either `Done` or `Error`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Done,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }
}

/// One durable record per job id. Flat on purpose so the persisted JSON
/// stays human-diffable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub status: JobStatus,
    pub stems: u8,
    pub track_folder: String,
    pub files: Vec<String>,
    pub error: String,
}

impl JobRecord {
    pub fn new(id: impl Into<String>, stems: u8) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Processing,
            stems,
            track_folder: String::new(),
            files: Vec::new(),
            error: String::new(),
        }
    }

    pub fn apply(&mut self, patch: JobPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(track_folder) = patch.track_folder {
            self.track_folder = track_folder;
        }
        if let Some(files) = patch.files {
            self.files = files;
        }
        if let Some(error) = patch.error {
            self.error = error;
        }
    }
}

/// Partial update merged into an existing record by `JobStore::update`.
#[derive(Clone, Debug, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub track_folder: Option<String>,
    pub files: Option<Vec<String>>,
    pub error: Option<String>,
}

impl JobPatch {
    pub fn done(track_folder: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            status: Some(JobStatus::Done),
            track_folder: Some(track_folder.into()),
            files: Some(files),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Error),
            track_folder: None,
            files: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// Root under which per-job work/output/record directories live.
    pub base_dir: PathBuf,
    /// Segment length handed to the segmenting transcoder, in seconds.
    pub chunk_secs: u32,
    /// Stem count used when the requested one is unsupported.
    pub default_stems: u8,
    /// Upper bound; larger requests are clamped, not rejected.
    pub max_stems: u8,
    /// Binary name or path of the ffmpeg transcoder.
    pub ffmpeg_bin: String,
    /// Python interpreter carrying the spleeter module.
    pub python_bin: String,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            chunk_secs: 45,
            default_stems: 4,
            max_stems: 4,
            ffmpeg_bin: "ffmpeg".into(),
            python_bin: "python3".into(),
        }
    }
}

/// Extensions the pipeline accepts as input.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["mp3", "wav", "flac", "m4a", "ogg"];

const STEMS_2: [&str; 2] = ["vocals", "accompaniment"];
const STEMS_4: [&str; 4] = ["vocals", "drums", "bass", "other"];
const STEMS_5: [&str; 5] = ["vocals", "drums", "bass", "piano", "other"];

/// Separation model profile resolved from a stem count. The stem-name order
/// is fixed and defines the merge order downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StemProfile {
    pub stems: u8,
    pub names: &'static [&'static str],
}

impl StemProfile {
    /// Resolves a requested stem count against the configured bounds.
    /// Unsupported counts fall back to the default; counts above the
    /// maximum are clamped silently.
    pub fn resolve(requested: u8, config: &SplitterConfig) -> Self {
        let mut stems = if matches!(requested, 2 | 4 | 5) {
            requested
        } else {
            config.default_stems
        };
        if stems > config.max_stems {
            stems = config.max_stems;
        }
        // A maximum between supported counts snaps down, never up, so the
        // effective count stays within the configured bound.
        let stems = match stems {
            5.. => 5,
            4 => 4,
            _ => 2,
        };
        Self::for_count(stems)
    }

    fn for_count(stems: u8) -> Self {
        let names: &'static [&'static str] = match stems {
            2 => &STEMS_2,
            5 => &STEMS_5,
            _ => &STEMS_4,
        };
        Self {
            stems: names.len() as u8,
            names,
        }
    }

    /// Model identifier passed to the decomposition engine.
    pub fn model_id(&self) -> String {
        format!("spleeter:{}stems", self.stems)
    }
}
