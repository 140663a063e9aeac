// src/merge/stages.rs

use crate::config::BuildOptions;

/// One step of the merge pipeline.
///
/// The order of the composed list is fixed; a disabled flag removes its stage
/// entirely instead of leaving a pass-through in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Delete the previous run's artifact at the output path.
    Clean,
    /// Read the input files in their listed order.
    ReadSources,
    /// Begin source-map tracking before any transformation.
    InitSourceMap,
    /// Merge all inputs into one unit, preserving input order.
    Concatenate,
    /// Pipe the concatenated unit through the configured transpiler.
    Transpile,
    /// Apply the request's minifier to the unit.
    Minify,
    /// Finalize the map and append the sourceMappingURL comment.
    WriteSourceMap,
    /// Write the final unit (and map file, when present) to the output dir.
    WriteArtifact,
    /// Fire the completion notification.
    NotifyDone,
}

/// Decide which stages a pipeline run consists of.
///
/// Transpilation applies only to the task literally named `scripts`, and only
/// to the concatenated unit (never per input file), so syntax forms that span
/// a file boundary still transpile.
pub fn compose_stages(task_name: &str, options: &BuildOptions) -> Vec<Stage> {
    let mut stages = vec![Stage::Clean, Stage::ReadSources];

    if options.sourcemaps {
        stages.push(Stage::InitSourceMap);
    }

    stages.push(Stage::Concatenate);

    if task_name == "scripts" && options.babel_enabled {
        stages.push(Stage::Transpile);
    }

    if options.production {
        stages.push(Stage::Minify);
    }

    if options.sourcemaps {
        stages.push(Stage::WriteSourceMap);
    }

    stages.push(Stage::WriteArtifact);
    stages.push(Stage::NotifyDone);

    stages
}
