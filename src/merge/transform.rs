// src/merge/transform.rs

//! Content transform contract for transpilers and minifiers.
//!
//! The pipeline never implements a transpiler or minifier itself; it applies
//! whatever [`ContentTransform`] it is handed. [`CommandTransform`] pipes the
//! unit through an external command's stdin/stdout, which is how real
//! transpilers are wired in; [`FnTransform`] wraps a closure for programmatic
//! use and tests.

use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;

use crate::errors::{MergewatchError, Result};

/// A transform applied to the whole concatenated unit.
pub trait ContentTransform: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, content: String) -> Result<String>;
}

impl fmt::Debug for dyn ContentTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentTransform")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Shared handle to a transform, as carried inside a build request.
pub type Minifier = Arc<dyn ContentTransform>;

/// Closure-backed transform.
pub struct FnTransform {
    name: String,
    func: Box<dyn Fn(String) -> Result<String> + Send + Sync>,
}

impl FnTransform {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(String) -> Result<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    /// Identity transform; carried by requests whose minifier is never
    /// applied (non-production builds).
    pub fn passthrough() -> Self {
        Self::new("passthrough", Ok)
    }
}

impl ContentTransform for FnTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, content: String) -> Result<String> {
        (self.func)(content)
    }
}

/// Transform that pipes content through an external command.
#[derive(Debug, Clone)]
pub struct CommandTransform {
    name: String,
    command: String,
    args: Vec<String>,
}

impl CommandTransform {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args,
        }
    }

    fn failed(&self, message: impl Into<String>) -> MergewatchError {
        MergewatchError::TransformFailed {
            name: self.name.clone(),
            message: message.into(),
        }
    }
}

impl ContentTransform for CommandTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, content: String) -> Result<String> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.failed(format!("failed to spawn '{}': {e}", self.command)))?;

        // Feed stdin from a separate thread; writing and reading from the
        // same thread can deadlock once either pipe buffer fills up.
        if let Some(mut stdin) = child.stdin.take() {
            std::thread::spawn(move || {
                let _ = stdin.write_all(content.as_bytes());
            });
        }

        let output = child
            .wait_with_output()
            .map_err(|e| self.failed(format!("failed to wait for '{}': {e}", self.command)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failed(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| self.failed(format!("'{}' produced invalid UTF-8: {e}", self.command)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fn_transform_applies_closure() {
        let upper = FnTransform::new("upper", |s: String| Ok(s.to_uppercase()));
        assert_eq!(upper.apply("abc".to_string()).unwrap(), "ABC");
    }

    #[test]
    fn passthrough_returns_input_unchanged() {
        let t = FnTransform::passthrough();
        assert_eq!(t.apply("a\nb".to_string()).unwrap(), "a\nb");
    }

    #[cfg(unix)]
    #[test]
    fn command_transform_pipes_through_process() {
        let t = CommandTransform::new(
            "upper",
            "sh",
            vec!["-c".to_string(), "tr a-z A-Z".to_string()],
        );
        assert_eq!(t.apply("hello".to_string()).unwrap(), "HELLO");
    }

    #[cfg(unix)]
    #[test]
    fn command_transform_reports_nonzero_exit() {
        let t = CommandTransform::new(
            "boom",
            "sh",
            vec!["-c".to_string(), "exit 3".to_string()],
        );
        let err = t.apply("hello".to_string()).unwrap_err();
        assert!(matches!(
            err,
            MergewatchError::TransformFailed { .. }
        ));
    }
}
