use std::sync::{Mutex, OnceLock};

/// Pipeline stage notifications, keyed by job id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobProgress {
    Chunking,
    Separating { done: usize, total: usize },
    Merging,
    Finished,
}

static JOB_PROGRESS_CB: OnceLock<Mutex<Option<Box<dyn Fn(&str, JobProgress) + Send + 'static>>>> =
    OnceLock::new();

pub fn set_job_progress_callback(cb: impl Fn(&str, JobProgress) + Send + 'static) {
    let _ = JOB_PROGRESS_CB.set(Mutex::new(Some(Box::new(cb))));
}

pub fn emit_job_progress(job_id: &str, progress: JobProgress) {
    if let Some(m) = JOB_PROGRESS_CB.get() {
        if let Ok(g) = m.lock() {
            if let Some(cb) = &*g {
                cb(job_id, progress);
            }
        }
    }
}
