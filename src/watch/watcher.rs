// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::errors::Result;
use crate::watch::hash::{compute_hash_for_paths, HashGuard};
use crate::watch::profiles::TaskWatchProfile;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher that observes `root` recursively and sends
/// `RuntimeEvent::TaskTriggered` for every task whose watch profile matches a
/// changed path.
///
/// With a [`HashGuard`] supplied, a match only triggers when the aggregate
/// content hash of the task's watched files changed since the last trigger.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    profiles: Vec<TaskWatchProfile>,
    runtime_tx: mpsc::UnboundedSender<RuntimeEvent>,
    hash_guard: Option<Arc<HashGuard>>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);

    let profiles = Arc::new(profiles);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // No tracing from inside the notify callback; stderr it is.
                    eprintln!("mergewatch: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("mergewatch: file watch error: {err}");
            }
        },
        Config::default(),
    )
    .map_err(|e| anyhow::anyhow!("creating filesystem watcher: {e}"))?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .map_err(|e| anyhow::anyhow!("watching {:?}: {e}", root))?;

    info!("file watcher started on {:?}", root);

    let async_root = root.clone();
    let async_profiles = Arc::clone(&profiles);
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!("received notify event: {:?}", event);

            for path in &event.paths {
                let Some(rel) = relative_str(&async_root, path) else {
                    warn!(
                        "could not relativize path {:?} against root {:?}",
                        path, async_root
                    );
                    continue;
                };

                for profile in async_profiles.iter() {
                    if !profile.matches(&rel) {
                        continue;
                    }

                    if let Some(guard) = &hash_guard {
                        match hash_for_profile(&async_root, profile) {
                            Ok(hash) if !guard.changed(profile.name(), &hash) => {
                                debug!(
                                    task = %profile.name(),
                                    path = %rel,
                                    "watch match skipped (content unchanged)"
                                );
                                continue;
                            }
                            Ok(_) => {}
                            Err(err) => {
                                warn!(
                                    task = %profile.name(),
                                    error = %err,
                                    "hashing watched files failed; triggering anyway"
                                );
                            }
                        }
                    }

                    debug!(
                        task = %profile.name(),
                        path = %rel,
                        "watch match -> triggering task"
                    );
                    if runtime_tx
                        .send(RuntimeEvent::TaskTriggered {
                            task: profile.name().to_string(),
                            reason: TriggerReason::FileWatch,
                        })
                        .is_err()
                    {
                        // Runtime channel closed; the watcher loop has no
                        // receiver left to feed.
                        return;
                    }
                }
            }
        }

        debug!("file watcher loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}

fn hash_for_profile(root: &Path, profile: &TaskWatchProfile) -> Result<String> {
    let absolute: Vec<PathBuf> = profile
        .paths()
        .iter()
        .map(|p| if p.is_absolute() { p.clone() } else { root.join(p) })
        .collect();
    compute_hash_for_paths(absolute)
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Falls back to canonicalizing both sides when the event path uses a
/// different absolute prefix for the same directory (symlinks, /private on
/// macOS). Returns `None` if the path cannot be related to `root`.
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(rel.to_string_lossy().replace('\\', "/"));
        }
    }

    None
}
