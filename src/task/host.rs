// src/task/host.rs

//! The host-scheduler boundary.
//!
//! The construction layer talks to a [`TaskHost`] instead of a concrete
//! runtime. Production code uses [`crate::engine::SchedulerHandle`]; tests
//! can provide a fake host that records definitions and invokes bodies
//! directly.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use crate::engine::TaskName;
use crate::errors::Result;

/// The future a task body resolves once every file-set pipeline finished.
pub type TaskFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// A named task's body: each invocation produces a fresh future that runs
/// all accumulated file-set pipelines in parallel and joins them.
pub type TaskBody = Arc<dyn Fn() -> TaskFuture + Send + Sync>;

/// Handle returned when a task has been queued for the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTask {
    pub name: TaskName,
}

/// Trait abstracting the host task scheduler.
pub trait TaskHost: Send + Sync {
    /// Define (or destructively redefine) the named task.
    fn define_task(&self, name: &str, body: TaskBody) -> Result<()>;

    /// Register the task's combined watch path list. The list replaces any
    /// previously registered list for the same name.
    fn register_watch(&self, name: &str, paths: &[PathBuf]) -> Result<()>;

    /// Enqueue the task for execution in the current run.
    fn queue_task(&self, name: &str) -> Result<QueuedTask>;
}
