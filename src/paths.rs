use crate::types::SplitterConfig;
use std::path::PathBuf;

/// Filesystem layout for one job. Every directory is keyed by the job id so
/// concurrent jobs never touch each other's files.
#[derive(Clone, Debug)]
pub struct JobDirs {
    pub chunks: PathBuf,
    pub separated: PathBuf,
    pub output: PathBuf,
}

impl JobDirs {
    pub fn new(config: &SplitterConfig, job_id: &str) -> Self {
        let work = config.base_dir.join("work").join(job_id);
        Self {
            chunks: work.join("chunks"),
            separated: work.join("separated"),
            output: config.base_dir.join("outputs").join(job_id),
        }
    }
}

/// Directory holding one persisted JSON document per job id.
pub fn records_dir(config: &SplitterConfig) -> PathBuf {
    config.base_dir.join("records")
}
