// src/merge/mod.rs

//! The file-merge pipeline.
//!
//! One pipeline run takes one file-set end-to-end: clean the stale artifact,
//! read the inputs in order, concatenate, optionally transpile and minify,
//! optionally emit a source map, write the destination, notify. Which stages
//! participate is decided up front by [`stages::compose_stages`]; the runner
//! in [`pipeline`] executes the resulting list without reordering.

pub mod clean;
pub mod pipeline;
pub mod sourcemap;
pub mod stages;
pub mod transform;

use std::path::PathBuf;

/// One input file read into memory.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub content: String,
}

/// The single concatenated unit flowing through the transform stages.
#[derive(Debug, Clone)]
pub struct MergedUnit {
    pub name: String,
    pub content: String,
}

pub use clean::remove_stale_artifact;
pub use pipeline::{MergeOutcome, MergePipeline};
pub use stages::{compose_stages, Stage};
pub use transform::{CommandTransform, ContentTransform, FnTransform, Minifier};
