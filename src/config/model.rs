// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::SourceKind;

/// Top-level build description as read from a TOML file.
///
/// ```toml
/// [options]
/// production = false
/// sourcemaps = true
///
/// [babel]
/// enabled = true
/// command = "babel"
/// args = ["--presets", "@babel/preset-env"]
///
/// [minify.scripts]
/// command = "terser"
/// args = ["--compress"]
///
/// [[task.scripts]]
/// files = ["js/app.js", "js/util.js"]
/// output_dir = "dist/js"
/// concat_file_name = "all.js"
/// ```
///
/// All sections are optional except `task`; several `[[task.<name>]]` entries
/// under the same name register several file-sets for that task.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBuildFile {
    /// Global build flags from `[options]`.
    #[serde(default)]
    pub options: OptionsSection,

    /// Transpiler settings from `[babel]`.
    #[serde(default)]
    pub babel: BabelSection,

    /// Minifier commands from `[minify.<kind>]`, keyed by kind name.
    #[serde(default)]
    pub minify: BTreeMap<String, CommandSpec>,

    /// All merge tasks from `[[task.<name>]]`.
    #[serde(default)]
    pub task: BTreeMap<String, Vec<RawMergeEntry>>,
}

/// `[options]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OptionsSection {
    /// Apply the configured minifier to every merged unit.
    #[serde(default)]
    pub production: bool,

    /// Track and emit a source map per merged unit.
    #[serde(default)]
    pub sourcemaps: bool,

    /// Skip watch-triggered rebuilds when the watched files' content hash is
    /// unchanged.
    #[serde(default)]
    pub use_hash: bool,
}

/// `[babel]` section.
///
/// The transpiler itself is external; content is piped through `command` with
/// `args` on stdin/stdout.
#[derive(Debug, Clone, Deserialize)]
pub struct BabelSection {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_babel_command")]
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,
}

fn default_babel_command() -> String {
    "babel".to_string()
}

impl Default for BabelSection {
    fn default() -> Self {
        Self {
            enabled: false,
            command: default_babel_command(),
            args: Vec::new(),
        }
    }
}

/// An external command to pipe content through (`[minify.<kind>]`).
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSpec {
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,
}

/// One `[[task.<name>]]` entry, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMergeEntry {
    /// Concatenation family. Defaults from the task name when the name is
    /// itself `styles` or `scripts`; required otherwise.
    #[serde(default)]
    pub kind: Option<SourceKind>,

    /// Ordered input paths, relative to the build-file directory.
    pub files: Vec<String>,

    /// Destination directory for the merged unit.
    pub output_dir: String,

    /// File name of the merged unit inside `output_dir`.
    pub concat_file_name: String,
}

/// A validated `[[task.<name>]]` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeEntry {
    pub kind: SourceKind,
    pub files: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub concat_file_name: String,
}

/// A validated build file.
///
/// Constructed only through `BuildFile::try_from(RawBuildFile)` (see
/// [`crate::config::validate`]).
#[derive(Debug, Clone)]
pub struct BuildFile {
    pub options: OptionsSection,
    pub babel: BabelSection,
    pub minify: BTreeMap<String, CommandSpec>,
    pub tasks: BTreeMap<String, Vec<MergeEntry>>,
}

impl BuildFile {
    pub(crate) fn new_unchecked(
        options: OptionsSection,
        babel: BabelSection,
        minify: BTreeMap<String, CommandSpec>,
        tasks: BTreeMap<String, Vec<MergeEntry>>,
    ) -> Self {
        Self {
            options,
            babel,
            minify,
            tasks,
        }
    }

    /// Minifier command for a kind, if configured.
    pub fn minify_spec(&self, kind: SourceKind) -> Option<&CommandSpec> {
        self.minify.get(kind.as_str())
    }
}

/// Effective build flags once the build file and CLI overrides are merged.
///
/// Read-only after construction; the mutable accumulation state lives in
/// [`crate::registry::BuildRegistry`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    pub production: bool,
    pub sourcemaps: bool,
    pub babel_enabled: bool,
    pub use_hash: bool,
}

impl BuildOptions {
    /// Build effective options from a validated build file, with CLI flags
    /// able to force `production` / `sourcemaps` on.
    pub fn from_build_file(build: &BuildFile, production: bool, sourcemaps: bool) -> Self {
        Self {
            production: build.options.production || production,
            sourcemaps: build.options.sourcemaps || sourcemaps,
            babel_enabled: build.babel.enabled,
            use_hash: build.options.use_hash,
        }
    }
}
