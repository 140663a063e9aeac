// src/task/constructor.rs

use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::merge::MergePipeline;
use crate::registry::{BuildRequest, SharedRegistry};
use crate::task::host::{QueuedTask, TaskHost};
use crate::task::registrar::TaskRegistrar;

/// Entry point of the construction layer.
///
/// Each call registers one more file-set under the request's task name, so
/// the same task can be built up additively across call sites. All
/// construction must finish before the runtime starts consuming triggers.
pub struct TaskConstructor {
    registry: SharedRegistry,
    host: Arc<dyn TaskHost>,
    registrar: TaskRegistrar,
}

impl TaskConstructor {
    pub fn new(
        registry: SharedRegistry,
        host: Arc<dyn TaskHost>,
        pipeline: Arc<MergePipeline>,
    ) -> Self {
        let registrar = TaskRegistrar::new(
            Arc::clone(&registry),
            Arc::clone(&host),
            pipeline,
        );
        Self {
            registry,
            host,
            registrar,
        }
    }

    /// Accumulate the request, (re)define its task and queue it.
    pub fn construct(&self, request: BuildRequest) -> Result<QueuedTask> {
        let total = {
            let mut registry = self.registry.lock().unwrap();
            registry.accumulate(&request)
        };
        debug!(
            task = %request.task_name,
            file_sets = total,
            "accumulated file-set"
        );

        self.registrar.define(&request)?;
        self.host.queue_task(&request.task_name)
    }
}
