// src/watch/profiles.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::engine::TaskName;
use crate::errors::Result;

/// Compiled watch patterns for a single task.
///
/// The watched paths are the task's accumulated input files (plain paths are
/// valid globs, and glob patterns are accepted as well). `matches` is fed
/// event paths normalized to forward slashes.
#[derive(Clone)]
pub struct TaskWatchProfile {
    name: TaskName,
    glob_set: GlobSet,
    /// The raw watched paths, kept for content hashing.
    paths: Vec<PathBuf>,
}

impl fmt::Debug for TaskWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskWatchProfile")
            .field("name", &self.name)
            .field("paths", &self.paths.len())
            .finish_non_exhaustive()
    }
}

impl TaskWatchProfile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Returns true if this task is interested in the given path.
    pub fn matches(&self, path: &str) -> bool {
        self.glob_set.is_match(path)
    }
}

/// Compile one watch profile per task from the registered watch lists.
pub fn build_watch_profiles(
    lists: &[(TaskName, Vec<PathBuf>)],
) -> Result<Vec<TaskWatchProfile>> {
    let mut profiles = Vec::with_capacity(lists.len());

    for (name, paths) in lists {
        let mut builder = GlobSetBuilder::new();
        for path in paths {
            let pattern = normalized(path);
            let glob = Glob::new(&pattern)
                .with_context(|| format!("invalid watch pattern '{pattern}' for task {name}"))?;
            builder.add(glob);
        }
        let glob_set = builder
            .build()
            .with_context(|| format!("building watch globset for task {name}"))?;

        profiles.push(TaskWatchProfile {
            name: name.clone(),
            glob_set,
            paths: paths.clone(),
        });
    }

    Ok(profiles)
}

/// Path rendered with forward slashes, matching how event paths are fed in.
pub fn normalized(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
