#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use mergewatch::merge::{FnTransform, Minifier};
use mergewatch::registry::BuildRequest;
use mergewatch::types::SourceKind;

/// Builder for `BuildRequest` to simplify test setup.
pub struct BuildRequestBuilder {
    request: BuildRequest,
}

impl BuildRequestBuilder {
    pub fn new(task_name: &str) -> Self {
        Self {
            request: BuildRequest {
                task_name: task_name.to_string(),
                kind: SourceKind::infer(task_name).unwrap_or(SourceKind::Scripts),
                files: Vec::new(),
                output_dir: PathBuf::from("dist"),
                concat_file_name: format!("{task_name}.out"),
                minifier: Arc::new(FnTransform::passthrough()),
            },
        }
    }

    pub fn kind(mut self, kind: SourceKind) -> Self {
        self.request.kind = kind;
        self
    }

    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.files.push(path.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.request.output_dir = dir.into();
        self
    }

    pub fn concat_file_name(mut self, name: &str) -> Self {
        self.request.concat_file_name = name.to_string();
        self
    }

    pub fn minifier(mut self, minifier: Minifier) -> Self {
        self.request.minifier = minifier;
        self
    }

    pub fn build(self) -> BuildRequest {
        self.request
    }
}

/// A minifier that uppercases the whole unit; handy for asserting the minify
/// stage ran.
pub fn uppercase_minifier() -> Minifier {
    Arc::new(FnTransform::new("uppercase", |content: String| {
        Ok(content.to_uppercase())
    }))
}
