// src/engine/scheduler.rs

//! Production [`TaskHost`] implementation.
//!
//! The construction layer talks to this handle; the handle writes into the
//! shared [`TaskTable`] and feeds the runtime's event channel. Watch lists
//! are recorded here and handed to the watcher once all construction is
//! done.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::runtime::TaskTable;
use crate::engine::{RuntimeEvent, TaskName, TriggerReason};
use crate::errors::{MergewatchError, Result};
use crate::task::{QueuedTask, TaskBody, TaskHost};

pub struct SchedulerHandle {
    table: Arc<TaskTable>,
    events_tx: mpsc::UnboundedSender<RuntimeEvent>,
    watch_lists: Mutex<HashMap<TaskName, Vec<PathBuf>>>,
}

impl SchedulerHandle {
    pub fn new(table: Arc<TaskTable>, events_tx: mpsc::UnboundedSender<RuntimeEvent>) -> Self {
        Self {
            table,
            events_tx,
            watch_lists: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of every registered watch list, for building watch profiles.
    pub fn watch_lists(&self) -> Vec<(TaskName, Vec<PathBuf>)> {
        let lists = self.watch_lists.lock().unwrap();
        lists
            .iter()
            .map(|(name, paths)| (name.clone(), paths.clone()))
            .collect()
    }
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl TaskHost for SchedulerHandle {
    fn define_task(&self, name: &str, body: TaskBody) -> Result<()> {
        self.table.define(name, body);
        Ok(())
    }

    fn register_watch(&self, name: &str, paths: &[PathBuf]) -> Result<()> {
        debug!(task = %name, paths = paths.len(), "watch list registered");
        let mut lists = self.watch_lists.lock().unwrap();
        lists.insert(name.to_string(), paths.to_vec());
        Ok(())
    }

    fn queue_task(&self, name: &str) -> Result<QueuedTask> {
        if !self.table.contains(name) {
            return Err(MergewatchError::TaskNotFound(name.to_string()));
        }

        self.events_tx
            .send(RuntimeEvent::TaskTriggered {
                task: name.to_string(),
                reason: TriggerReason::Manual,
            })
            .map_err(|e| {
                MergewatchError::Other(anyhow::anyhow!(
                    "runtime event channel closed while queueing '{name}': {e}"
                ))
            })?;

        Ok(QueuedTask {
            name: name.to_string(),
        })
    }
}
