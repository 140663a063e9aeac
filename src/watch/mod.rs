// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling per-task watch profiles from the registered watch path lists.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - (Optionally) content hashing, so a watch event for unchanged files does
//!   not re-trigger the task.
//!
//! It knows nothing about pipelines or the registry; it only turns
//! filesystem changes into task-level triggers.

pub mod hash;
pub mod profiles;
pub mod watcher;

pub use hash::{compute_hash_for_paths, HashGuard};
pub use profiles::{build_watch_profiles, TaskWatchProfile};
pub use watcher::{spawn_watcher, WatcherHandle};
