// src/watch/hash.rs

//! Content hashing for watch triggers.
//!
//! With `use_hash` enabled, a watch event only re-triggers a task when the
//! aggregate hash over its watched files actually changed since the last
//! trigger. Hashes are held in memory and lost on restart.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use blake3::Hasher;
use tracing::debug;

use crate::engine::TaskName;
use crate::errors::Result;

/// Compute the hash of a single file.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file =
        File::open(path).with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Compute a deterministic aggregate hash over the given files.
///
/// Paths are sorted before hashing so the result does not depend on
/// iteration order; missing paths are skipped.
pub fn compute_hash_for_paths<I, P>(paths: I) -> Result<String>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut sorted: Vec<PathBuf> = paths
        .into_iter()
        .map(|p| p.as_ref().to_path_buf())
        .collect();
    sorted.sort();

    let mut hasher = Hasher::new();
    for path in sorted {
        if path.is_file() {
            let file_hash = compute_file_hash(&path)?;
            hasher.update(file_hash.as_bytes());
        }
    }

    Ok(hasher.finalize().to_hex().to_string())
}

/// Per-task record of the last triggering hash.
#[derive(Debug, Default)]
pub struct HashGuard {
    hashes: Mutex<HashMap<TaskName, String>>,
}

impl HashGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the hash and report whether it differs from the last one seen
    /// for this task. The first hash for a task always counts as changed.
    pub fn changed(&self, task: &str, hash: &str) -> bool {
        let mut hashes = self.hashes.lock().unwrap();
        match hashes.insert(task.to_string(), hash.to_string()) {
            Some(previous) if previous == hash => {
                debug!(task = %task, "watched content unchanged");
                false
            }
            _ => true,
        }
    }
}
