// src/registry.rs

//! Shared build registry: the one piece of mutable state in the system.
//!
//! Every call to the task constructor appends to this registry; task bodies
//! read an immutable snapshot from it at invocation time. Accumulation
//! (append-or-create at a key) is the only mutation it offers; entries are
//! never removed within a process run.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::engine::TaskName;
use crate::merge::transform::Minifier;
use crate::types::SourceKind;

/// One request to merge an ordered set of files into a single destination.
///
/// Immutable once submitted to [`crate::task::TaskConstructor`].
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub task_name: TaskName,
    pub kind: SourceKind,
    /// Ordered input paths; concatenation order follows this list exactly.
    pub files: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub concat_file_name: String,
    /// Applied to the merged unit when the build runs in production mode.
    pub minifier: Minifier,
}

/// A [`BuildRequest`] retained inside the registry: one of possibly several
/// inputs feeding the task it was registered under.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSet {
    pub kind: SourceKind,
    pub files: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub concat_file_name: String,
}

impl FileSet {
    /// Destination path of this file-set's merged unit.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.concat_file_name)
    }
}

impl From<&BuildRequest> for FileSet {
    fn from(request: &BuildRequest) -> Self {
        Self {
            kind: request.kind,
            files: request.files.clone(),
            output_dir: request.output_dir.clone(),
            concat_file_name: request.concat_file_name.clone(),
        }
    }
}

/// Accumulated file-sets and watch paths, keyed by task name.
#[derive(Debug, Default)]
pub struct BuildRegistry {
    file_sets: HashMap<TaskName, Vec<FileSet>>,
    watch_paths: HashMap<TaskName, Vec<PathBuf>>,
}

/// The registry as shared between the constructor, task bodies and the
/// wiring layer.
pub type SharedRegistry = Arc<Mutex<BuildRegistry>>;

impl BuildRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(Mutex::new(self))
    }

    /// Append the request's file-set to its task's list.
    ///
    /// No deduplication: registering an identical request twice doubles the
    /// merge on the next run. Returns the new list length.
    pub fn accumulate(&mut self, request: &BuildRequest) -> usize {
        let sets = self
            .file_sets
            .entry(request.task_name.clone())
            .or_default();
        sets.push(FileSet::from(request));
        sets.len()
    }

    /// Snapshot of the file-sets registered under a task name.
    pub fn file_sets(&self, task: &str) -> Vec<FileSet> {
        self.file_sets.get(task).cloned().unwrap_or_default()
    }

    /// Append new watch paths to a task's watch list and return the combined
    /// list (order preserved, no deduplication).
    pub fn append_watch_paths(&mut self, task: &str, paths: &[PathBuf]) -> Vec<PathBuf> {
        let list = self.watch_paths.entry(task.to_string()).or_default();
        list.extend(paths.iter().cloned());
        list.clone()
    }

    /// Snapshot of a task's accumulated watch list.
    pub fn watch_paths(&self, task: &str) -> Vec<PathBuf> {
        self.watch_paths.get(task).cloned().unwrap_or_default()
    }
}
