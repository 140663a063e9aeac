// src/task/mod.rs

//! Task construction: turning build requests into named, watchable tasks.
//!
//! [`TaskConstructor`] is the only externally invoked entry point. For each
//! request it accumulates the file-set in the shared registry, has
//! [`TaskRegistrar`] (re)define the task against the [`TaskHost`] boundary,
//! registers the combined watch list, and queues the task for the current
//! run.

pub mod constructor;
pub mod host;
pub mod registrar;

pub use constructor::TaskConstructor;
pub use host::{QueuedTask, TaskBody, TaskFuture, TaskHost};
pub use registrar::TaskRegistrar;
