// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{BuildFile, RawBuildFile};
use crate::errors::Result;

/// Load a build file from a given path and return the raw `RawBuildFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (kind agreement, output collisions, etc.). Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawBuildFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let build: RawBuildFile = toml::from_str(&contents)?;

    Ok(build)
}

/// Load a build file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - at least one task with at least one file-set,
///   - non-empty file lists and destination fields,
///   - a resolvable `kind` per entry, agreeing within each task,
///   - distinct output paths across all file-sets.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<BuildFile> {
    let raw = load_from_path(&path)?;
    let build = BuildFile::try_from(raw)?;
    Ok(build)
}

/// Helper to resolve the default build file path.
///
/// Currently this just returns `Mergewatch.toml` in the current working
/// directory.
pub fn default_build_file_path() -> PathBuf {
    PathBuf::from("Mergewatch.toml")
}
