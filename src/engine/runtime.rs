// src/engine/runtime.rs

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::{RuntimeEvent, RuntimeOptions, TaskName, TaskOutcome, TriggerReason};
use crate::errors::Result;
use crate::task::TaskBody;

/// The currently defined tasks, shared between the runtime and the
/// scheduler handle.
///
/// Defining a name that already exists replaces the previous body.
#[derive(Default)]
pub struct TaskTable {
    tasks: Mutex<HashMap<TaskName, TaskBody>>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&self, name: &str, body: TaskBody) {
        let mut tasks = self.tasks.lock().unwrap();
        let replaced = tasks.insert(name.to_string(), body).is_some();
        debug!(task = %name, replaced, "task defined");
    }

    pub fn get(&self, name: &str) -> Option<TaskBody> {
        let tasks = self.tasks.lock().unwrap();
        tasks.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        let tasks = self.tasks.lock().unwrap();
        tasks.contains_key(name)
    }

    pub fn names(&self) -> Vec<TaskName> {
        let tasks = self.tasks.lock().unwrap();
        tasks.keys().cloned().collect()
    }
}

impl fmt::Debug for TaskTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskTable")
            .field("tasks", &self.names())
            .finish()
    }
}

/// The main orchestration runtime.
///
/// Responsibilities:
/// - Consume [`RuntimeEvent`]s from construction, watchers and invocations.
/// - Invoke task bodies, one invocation per task at a time.
/// - Coalesce triggers that arrive while a task is running into one pending
///   re-run.
pub struct Runtime {
    table: Arc<TaskTable>,
    options: RuntimeOptions,

    /// Unified event stream from all producers.
    events_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
    /// Cloned into spawned invocations so they can report completion.
    events_tx: mpsc::UnboundedSender<RuntimeEvent>,

    running: HashSet<TaskName>,
    pending: HashSet<TaskName>,
}

impl Runtime {
    pub fn new(
        table: Arc<TaskTable>,
        options: RuntimeOptions,
        events_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
        events_tx: mpsc::UnboundedSender<RuntimeEvent>,
    ) -> Self {
        Self {
            table,
            options,
            events_rx,
            events_tx,
            running: HashSet::new(),
            pending: HashSet::new(),
        }
    }

    /// Main event loop. Returns when a shutdown is requested, the channel
    /// closes, or (`exit_when_idle`) everything has completed.
    pub async fn run(mut self) -> Result<()> {
        info!("mergewatch runtime started");

        while let Some(event) = self.events_rx.recv().await {
            debug!(?event, "runtime received event");

            let keep_running = match event {
                RuntimeEvent::TaskTriggered { task, reason } => {
                    self.handle_trigger(task, reason)
                }
                RuntimeEvent::TaskCompleted { task, outcome } => {
                    self.handle_completion(task, outcome)
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping runtime");
                    false
                }
            };

            if !keep_running {
                break;
            }
        }

        info!("mergewatch runtime exiting");
        Ok(())
    }

    fn handle_trigger(&mut self, task: TaskName, reason: TriggerReason) -> bool {
        info!(task = %task, ?reason, "task triggered");

        if self.running.contains(&task) {
            // Coalesce: one pending re-run regardless of how many triggers
            // arrive while the task is in flight.
            self.pending.insert(task);
        } else {
            self.invoke(task);
        }

        !self.should_exit()
    }

    fn handle_completion(&mut self, task: TaskName, outcome: TaskOutcome) -> bool {
        match outcome {
            TaskOutcome::Success => info!(task = %task, "task completed successfully"),
            TaskOutcome::Failed => warn!(task = %task, "task failed"),
        }

        self.running.remove(&task);

        if self.pending.remove(&task) {
            debug!(task = %task, "starting pending re-run");
            self.invoke(task);
        }

        !self.should_exit()
    }

    /// Spawn one invocation of the task's current body.
    fn invoke(&mut self, task: TaskName) {
        let Some(body) = self.table.get(&task) else {
            warn!(task = %task, "trigger for unknown task; ignoring");
            return;
        };

        self.running.insert(task.clone());

        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = match body().await {
                Ok(()) => TaskOutcome::Success,
                Err(err) => {
                    error!(task = %task, error = %err, "task body returned an error");
                    TaskOutcome::Failed
                }
            };

            if events_tx
                .send(RuntimeEvent::TaskCompleted { task, outcome })
                .is_err()
            {
                // Runtime already gone; nothing left to report to.
            }
        });
    }

    fn should_exit(&self) -> bool {
        if !self.options.exit_when_idle {
            return false;
        }
        if self.running.is_empty() && self.pending.is_empty() {
            info!("runtime idle and exit_when_idle=true, stopping");
            return true;
        }
        false
    }
}
