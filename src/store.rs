//! Durable, crash-recoverable storage of job records.
//!
//! A single `Mutex` serializes every cache mutation; the lock is held only
//! for a read or a merge-and-persist, never across external-process calls.
//! Every update persists synchronously before returning, so the durable
//! records always reflect the last acknowledged state.

use crate::{
    error::{Result, SplitterError},
    types::{JobPatch, JobRecord},
};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::debug;

/// Pluggable durable adapter behind the in-memory cache.
pub trait DurableStore: Send + Sync {
    fn save(&self, record: &JobRecord) -> Result<()>;
    fn load(&self, id: &str) -> Result<Option<JobRecord>>;
}

/// One flat JSON document per job id, written atomically.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl DurableStore for JsonFileStore {
    fn save(&self, record: &JobRecord) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let dest = self.record_path(&record.id);
        let tmp = dest.with_extension("part");
        fs::write(&tmp, serde_json::to_vec_pretty(record)?)?;
        fs::rename(&tmp, &dest)?;
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<JobRecord>> {
        let path = self.record_path(id);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

/// Read/write-through cache over a durable adapter. The cache is not
/// authoritative: it starts empty after a restart and repopulates lazily
/// from the durable records.
pub struct JobStore {
    cache: Mutex<HashMap<String, JobRecord>>,
    durable: Box<dyn DurableStore>,
}

impl JobStore {
    pub fn new(durable: Box<dyn DurableStore>) -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            durable,
        }
    }

    /// Opens a store over the given records directory.
    pub fn open(records_dir: &Path) -> Self {
        Self::new(Box::new(JsonFileStore::new(records_dir)))
    }

    /// Records are plain data, so a panic in another worker cannot leave
    /// the map half-mutated; recover the guard instead of propagating the
    /// poison.
    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, JobRecord>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Inserts a new record. The caller guarantees id uniqueness.
    pub fn create(&self, record: JobRecord) -> Result<()> {
        let mut cache = self.lock_cache();
        self.durable.save(&record)?;
        debug!(job = %record.id, "record created");
        cache.insert(record.id.clone(), record);
        Ok(())
    }

    /// Merges `patch` into the record for `id` (creating it if absent) and
    /// persists the merged record before returning.
    pub fn update(&self, id: &str, patch: JobPatch) -> Result<()> {
        let mut cache = self.lock_cache();

        let mut record = match cache.get(id) {
            Some(r) => r.clone(),
            None => match self.durable.load(id)? {
                Some(r) => r,
                None => JobRecord::new(id, 0),
            },
        };
        record.apply(patch);

        self.durable.save(&record)?;
        cache.insert(id.to_string(), record);
        Ok(())
    }

    /// Returns the record for `id`, loading it from the durable adapter on
    /// a cache miss.
    pub fn get(&self, id: &str) -> Result<JobRecord> {
        let mut cache = self.lock_cache();

        if let Some(record) = cache.get(id) {
            return Ok(record.clone());
        }

        match self.durable.load(id)? {
            Some(record) => {
                cache.insert(id.to_string(), record.clone());
                Ok(record)
            }
            None => Err(SplitterError::RecordNotFound(id.to_string())),
        }
    }
}
