//! Fake external tools driven through the `Transcoder`/`SeparationEngine`
//! seams. Input "tracks" are text files whose content is the duration in
//! seconds; fake chunks carry their own duration, so merged outputs encode
//! the chunk order they were assembled from.

#![allow(dead_code)]

use music_splitter_core::{Result, SeparationEngine, SplitterError, Transcoder};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

pub struct FakeTranscoder {
    /// Segment succeeds but produces no files.
    pub produce_zero: bool,
}

impl FakeTranscoder {
    pub fn new() -> Self {
        Self {
            produce_zero: false,
        }
    }
}

impl Transcoder for FakeTranscoder {
    fn check(&self) -> Result<()> {
        Ok(())
    }

    fn segment(&self, input: &Path, chunk_secs: u32, out_pattern: &Path) -> Result<()> {
        if self.produce_zero {
            return Ok(());
        }

        let duration: u32 = fs::read_to_string(input)
            .expect("fake input readable")
            .trim()
            .parse()
            .expect("fake input holds a duration");

        let pattern = out_pattern
            .file_name()
            .and_then(|n| n.to_str())
            .expect("pattern file name")
            .to_string();
        let dir = out_pattern.parent().expect("pattern parent");

        let mut remaining = duration;
        let mut index = 0usize;
        while remaining > 0 {
            let len = remaining.min(chunk_secs);
            let name = pattern.replace("%03d", &format!("{index:03}"));
            fs::write(dir.join(name), len.to_string())?;
            remaining -= len;
            index += 1;
        }
        Ok(())
    }

    fn concat(&self, manifest: &Path, output: &Path) -> Result<()> {
        let listing = fs::read_to_string(manifest)?;
        let mut parts = Vec::new();
        for line in listing.lines() {
            let path = line
                .trim()
                .strip_prefix("file '")
                .and_then(|rest| rest.strip_suffix('\''))
                .expect("concat manifest line");
            parts.push(fs::read_to_string(path)?);
        }
        fs::write(output, parts.join("+"))?;
        Ok(())
    }
}

pub struct FakeEngine {
    /// Zero-based invocation index that fails, with this diagnostic.
    pub fail_on_chunk: Option<usize>,
    pub diagnostic: String,
    calls: Mutex<usize>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            fail_on_chunk: None,
            diagnostic: String::new(),
            calls: Mutex::new(0),
        }
    }

    pub fn failing_on(chunk: usize, diagnostic: &str) -> Self {
        Self {
            fail_on_chunk: Some(chunk),
            diagnostic: diagnostic.to_string(),
            calls: Mutex::new(0),
        }
    }

    fn stem_names(model_id: &str) -> &'static [&'static str] {
        match model_id {
            "spleeter:2stems" => &["vocals", "accompaniment"],
            "spleeter:5stems" => &["vocals", "drums", "bass", "piano", "other"],
            _ => &["vocals", "drums", "bass", "other"],
        }
    }
}

impl SeparationEngine for FakeEngine {
    fn check(&self) -> Result<()> {
        Ok(())
    }

    fn separate(&self, chunk: &Path, model_id: &str, out_dir: &Path) -> Result<()> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let current = *calls;
            *calls += 1;
            current
        };
        if self.fail_on_chunk == Some(call) {
            return Err(SplitterError::Separation(self.diagnostic.clone()));
        }

        let base = chunk
            .file_stem()
            .and_then(|s| s.to_str())
            .expect("chunk base name");
        let chunk_out = out_dir.join(base);
        fs::create_dir_all(&chunk_out)?;

        let content = fs::read_to_string(chunk)?;
        for stem in Self::stem_names(model_id) {
            fs::write(chunk_out.join(format!("{stem}.wav")), &content)?;
        }
        Ok(())
    }
}

/// An engine that always refuses its availability check.
pub struct UnavailableEngine;

impl SeparationEngine for UnavailableEngine {
    fn check(&self) -> Result<()> {
        Err(SplitterError::DependencyMissing(
            "Spleeter is not installed in this Python environment: python3".into(),
        ))
    }

    fn separate(&self, _chunk: &Path, _model_id: &str, _out_dir: &Path) -> Result<()> {
        unreachable!("check() fails first")
    }
}

/// Writes a fake track of the given duration and returns its path.
pub fn write_track(dir: &Path, name: &str, duration_secs: u32) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, duration_secs.to_string()).unwrap();
    path
}
