// src/notifier.rs

//! User-facing completion notifications.
//!
//! The merge pipeline ends every successful file-set with a single
//! fire-and-forget message. The transport is behind the [`Notifier`] trait so
//! the pipeline never depends on a concrete notification mechanism; tests use
//! a collecting implementation from the test-utils crate.

use std::fmt::Debug;

use tracing::info;

/// Capability interface for end-of-pipeline notifications.
pub trait Notifier: Send + Sync + Debug {
    fn notify(&self, message: &str);
}

/// Default implementation: emit the message through the logging sink.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        info!(target: "mergewatch::notify", "{message}");
    }
}
