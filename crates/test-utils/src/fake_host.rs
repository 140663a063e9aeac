use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use mergewatch::errors::{MergewatchError, Result};
use mergewatch::notifier::Notifier;
use mergewatch::task::{QueuedTask, TaskBody, TaskFuture, TaskHost};

/// A fake task host that:
/// - records defined bodies, registered watch lists and queued names
/// - lets tests invoke a task body directly, without a runtime.
#[derive(Default)]
pub struct FakeHost {
    defined: Mutex<HashMap<String, TaskBody>>,
    define_counts: Mutex<HashMap<String, usize>>,
    watch_lists: Mutex<HashMap<String, Vec<PathBuf>>>,
    queued: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke the current body of a defined task.
    pub fn invoke(&self, name: &str) -> Result<TaskFuture> {
        let defined = self.defined.lock().unwrap();
        match defined.get(name) {
            Some(body) => Ok(body()),
            None => Err(MergewatchError::TaskNotFound(name.to_string())),
        }
    }

    /// How many times `define_task` was called for this name.
    pub fn define_count(&self, name: &str) -> usize {
        let counts = self.define_counts.lock().unwrap();
        counts.get(name).copied().unwrap_or(0)
    }

    /// The most recently registered watch list for this name.
    pub fn watch_list(&self, name: &str) -> Vec<PathBuf> {
        let lists = self.watch_lists.lock().unwrap();
        lists.get(name).cloned().unwrap_or_default()
    }

    /// Every queued task name, in queueing order.
    pub fn queued(&self) -> Vec<String> {
        self.queued.lock().unwrap().clone()
    }
}

impl TaskHost for FakeHost {
    fn define_task(&self, name: &str, body: TaskBody) -> Result<()> {
        self.defined.lock().unwrap().insert(name.to_string(), body);
        *self
            .define_counts
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_insert(0) += 1;
        Ok(())
    }

    fn register_watch(&self, name: &str, paths: &[PathBuf]) -> Result<()> {
        self.watch_lists
            .lock()
            .unwrap()
            .insert(name.to_string(), paths.to_vec());
        Ok(())
    }

    fn queue_task(&self, name: &str) -> Result<QueuedTask> {
        self.queued.lock().unwrap().push(name.to_string());
        Ok(QueuedTask {
            name: name.to_string(),
        })
    }
}

/// A notifier that collects every message for later assertions.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<String>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
