// src/task/registrar.rs

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{MergewatchError, Result};
use crate::merge::MergePipeline;
use crate::registry::{BuildRequest, SharedRegistry};
use crate::task::host::{TaskBody, TaskHost};

/// Defines tasks against the host and wires up their watch lists.
///
/// Redefinition is destructive: defining the same name again replaces the
/// previous body entirely. Because the body reads the registry when invoked,
/// the replacement transparently covers every file-set registered so far.
pub struct TaskRegistrar {
    registry: SharedRegistry,
    host: Arc<dyn TaskHost>,
    pipeline: Arc<MergePipeline>,
}

impl TaskRegistrar {
    pub fn new(
        registry: SharedRegistry,
        host: Arc<dyn TaskHost>,
        pipeline: Arc<MergePipeline>,
    ) -> Self {
        Self {
            registry,
            host,
            pipeline,
        }
    }

    /// (Re)define `request.task_name` and register its watch targets.
    pub fn define(&self, request: &BuildRequest) -> Result<()> {
        let body = self.build_body(request);
        self.host.define_task(&request.task_name, body)?;

        let combined = {
            let mut registry = self.registry.lock().unwrap();
            registry.append_watch_paths(&request.task_name, &request.files)
        };
        debug!(
            task = %request.task_name,
            watch_paths = combined.len(),
            "registering watch list"
        );
        self.host.register_watch(&request.task_name, &combined)?;

        Ok(())
    }

    /// Build the task body: snapshot the file-set list at invocation time,
    /// fan out one pipeline per file-set, join all completions.
    fn build_body(&self, request: &BuildRequest) -> TaskBody {
        let registry = Arc::clone(&self.registry);
        let pipeline = Arc::clone(&self.pipeline);
        let request = Arc::new(request.clone());

        Arc::new(move || {
            let registry = Arc::clone(&registry);
            let pipeline = Arc::clone(&pipeline);
            let request = Arc::clone(&request);

            Box::pin(async move {
                let sets = {
                    let registry = registry.lock().unwrap();
                    registry.file_sets(&request.task_name)
                };

                if sets.is_empty() {
                    warn!(task = %request.task_name, "task invoked with no file-sets");
                    return Ok(());
                }

                let mut handles = Vec::with_capacity(sets.len());
                for set in sets {
                    let pipeline = Arc::clone(&pipeline);
                    let request = Arc::clone(&request);
                    handles.push(tokio::task::spawn_blocking(move || {
                        pipeline.run(&set, &request)
                    }));
                }

                // Fan-in: wait for every file-set, then report the first
                // failure. Siblings of a failed set are not rolled back.
                let mut first_error: Option<MergewatchError> = None;
                for handle in handles {
                    match handle.await {
                        Ok(Ok(_outcome)) => {}
                        Ok(Err(err)) => {
                            first_error.get_or_insert(err);
                        }
                        Err(join_err) => {
                            first_error.get_or_insert(MergewatchError::Other(
                                anyhow::anyhow!("pipeline task panicked: {join_err}"),
                            ));
                        }
                    }
                }

                match first_error {
                    Some(err) => Err(err),
                    None => Ok(()),
                }
            })
        })
    }
}
