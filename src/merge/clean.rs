// src/merge/clean.rs

use std::path::Path;

use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;

/// Delete the merged file from the previous run.
///
/// No-op when nothing exists at `path`. A failed deletion propagates and is
/// fatal to the calling file-set's pipeline; the destination must be gone
/// before anything is written to it again.
pub fn remove_stale_artifact(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    if fs.exists(path) {
        debug!(path = ?path, "removing stale artifact");
        fs.remove_file(path)?;
    }
    Ok(())
}
