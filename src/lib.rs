//! # music-splitter-core
//!
//! Chunked job pipeline for audio stem separation: splits a track into
//! bounded segments, runs an external decomposition engine per segment,
//! reassembles the stems losslessly, and tracks each job durably while the
//! work runs on its own thread.

pub mod core;
pub mod error;
pub mod jobs;
pub mod paths;
pub mod progress;
pub mod store;
pub mod tools;
pub mod types;

pub use crate::{
    error::{Result, SplitterError},
    jobs::JobManager,
    progress::{set_job_progress_callback, JobProgress},
    store::{DurableStore, JobStore, JsonFileStore},
    tools::{FfmpegTranscoder, SeparationEngine, SpleeterEngine, Transcoder},
    types::{JobPatch, JobRecord, JobStatus, SplitterConfig, StemProfile},
};
