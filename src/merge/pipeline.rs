// src/merge/pipeline.rs

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::BuildOptions;
use crate::errors::{MergewatchError, Result};
use crate::fs::FileSystem;
use crate::merge::clean::remove_stale_artifact;
use crate::merge::sourcemap::{source_mapping_comment, SourceMapBuilder};
use crate::merge::stages::{compose_stages, Stage};
use crate::merge::transform::ContentTransform;
use crate::merge::{MergedUnit, SourceUnit};
use crate::notifier::Notifier;
use crate::registry::{BuildRequest, FileSet};

/// Result of one successful file-set pipeline run.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub artifact_path: PathBuf,
    pub bytes_written: usize,
    pub map_path: Option<PathBuf>,
}

/// Mutable state threaded through the stage list of one run.
#[derive(Default)]
struct PipelineState {
    sources: Vec<SourceUnit>,
    unit: Option<MergedUnit>,
    map: Option<SourceMapBuilder>,
    map_file: Option<(String, String)>,
    bytes_written: usize,
}

/// Executes the composed stage list for one file-set.
///
/// A pipeline is shared between all file-sets of all tasks; everything
/// per-run lives in the stage state, so concurrent runs never interfere as
/// long as their output paths are disjoint.
#[derive(Debug)]
pub struct MergePipeline {
    fs: Arc<dyn FileSystem>,
    notifier: Arc<dyn Notifier>,
    transpiler: Option<Arc<dyn ContentTransform>>,
    options: BuildOptions,
}

impl MergePipeline {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        notifier: Arc<dyn Notifier>,
        transpiler: Option<Arc<dyn ContentTransform>>,
        options: BuildOptions,
    ) -> Self {
        Self {
            fs,
            notifier,
            transpiler,
            options,
        }
    }

    /// Run the whole pipeline for one file-set.
    ///
    /// Failures are logged through the same sink as progress messages and
    /// abort the remaining stages for this file-set only.
    pub fn run(&self, set: &FileSet, request: &BuildRequest) -> Result<MergeOutcome> {
        match self.run_inner(set, request) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!(
                    task = %request.task_name,
                    files = ?set.files,
                    error = %err,
                    "merge pipeline failed"
                );
                Err(err)
            }
        }
    }

    fn run_inner(&self, set: &FileSet, request: &BuildRequest) -> Result<MergeOutcome> {
        let output_path = set.output_path();
        let stages = compose_stages(&request.task_name, &self.options);
        debug!(task = %request.task_name, ?stages, "composed pipeline stages");

        let mut state = PipelineState::default();
        for stage in &stages {
            self.execute(*stage, set, request, &output_path, &mut state)?;
        }

        Ok(MergeOutcome {
            artifact_path: output_path,
            bytes_written: state.bytes_written,
            map_path: state
                .map_file
                .map(|(name, _)| set.output_dir.join(name)),
        })
    }

    fn execute(
        &self,
        stage: Stage,
        set: &FileSet,
        request: &BuildRequest,
        output_path: &std::path::Path,
        state: &mut PipelineState,
    ) -> Result<()> {
        match stage {
            Stage::Clean => remove_stale_artifact(self.fs.as_ref(), output_path),
            Stage::ReadSources => self.read_sources(set, state),
            Stage::InitSourceMap => {
                state.map = Some(SourceMapBuilder::new());
                Ok(())
            }
            Stage::Concatenate => self.concatenate(set, state),
            Stage::Transpile => self.transpile(state),
            Stage::Minify => self.minify(request, state),
            Stage::WriteSourceMap => self.write_source_map(set, state),
            Stage::WriteArtifact => self.write_artifact(set, output_path, state),
            Stage::NotifyDone => {
                self.notifier.notify("Files merged!");
                Ok(())
            }
        }
    }

    fn read_sources(&self, set: &FileSet, state: &mut PipelineState) -> Result<()> {
        let label = if self.options.production {
            "Merging and Minifying"
        } else {
            "Merging"
        };
        info!(files = ?set.files, "{label}");

        for path in &set.files {
            if !self.fs.exists(path) {
                return Err(MergewatchError::MissingInput(path.clone()));
            }
            let content = self.fs.read_to_string(path)?;
            state.sources.push(SourceUnit {
                path: path.clone(),
                content,
            });
        }
        Ok(())
    }

    fn concatenate(&self, set: &FileSet, state: &mut PipelineState) -> Result<()> {
        let mut merged = String::new();
        for source in state.sources.drain(..) {
            if let Some(map) = state.map.as_mut() {
                map.add_source(&source.path, &source.content);
            }
            merged.push_str(&source.content);
        }

        state.unit = Some(MergedUnit {
            name: set.concat_file_name.clone(),
            content: merged,
        });
        Ok(())
    }

    fn transpile(&self, state: &mut PipelineState) -> Result<()> {
        let Some(transpiler) = &self.transpiler else {
            return Err(MergewatchError::ConfigError(
                "babel is enabled but no transpiler is configured".to_string(),
            ));
        };

        let unit = expect_unit(state)?;
        debug!(transform = transpiler.name(), "transpiling merged unit");
        unit.content = transpiler.apply(std::mem::take(&mut unit.content))?;
        Ok(())
    }

    fn minify(&self, request: &BuildRequest, state: &mut PipelineState) -> Result<()> {
        let unit = expect_unit(state)?;
        debug!(transform = request.minifier.name(), "minifying merged unit");
        unit.content = request
            .minifier
            .apply(std::mem::take(&mut unit.content))?;
        Ok(())
    }

    fn write_source_map(&self, set: &FileSet, state: &mut PipelineState) -> Result<()> {
        let Some(builder) = state.map.take() else {
            return Err(MergewatchError::ConfigError(
                "source-map stage ran without an initialized map".to_string(),
            ));
        };

        let map_file_name = format!("{}.map", set.concat_file_name);
        let json = builder.finalize(&set.concat_file_name);

        let unit = expect_unit(state)?;
        unit.content
            .push_str(&source_mapping_comment(set.kind, &map_file_name));

        state.map_file = Some((map_file_name, json));
        Ok(())
    }

    fn write_artifact(
        &self,
        set: &FileSet,
        output_path: &std::path::Path,
        state: &mut PipelineState,
    ) -> Result<()> {
        let written = {
            let unit = expect_unit(state)?;
            self.fs.write(output_path, unit.content.as_bytes())?;
            unit.content.len()
        };
        state.bytes_written = written;

        if let Some((name, json)) = &state.map_file {
            self.fs.write(&set.output_dir.join(name), json.as_bytes())?;
        }

        info!(path = ?output_path, bytes = written, "wrote merged unit");
        Ok(())
    }
}

fn expect_unit(state: &mut PipelineState) -> Result<&mut MergedUnit> {
    state.unit.as_mut().ok_or_else(|| {
        MergewatchError::ConfigError(
            "pipeline stage ran before concatenation produced a unit".to_string(),
        )
    })
}
