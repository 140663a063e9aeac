// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod merge;
pub mod notifier;
pub mod registry;
pub mod task;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, BuildFile, BuildOptions, MergeEntry};
use crate::engine::{Runtime, RuntimeEvent, RuntimeOptions, SchedulerHandle, TaskTable};
use crate::errors::{MergewatchError, Result};
use crate::fs::RealFileSystem;
use crate::merge::{CommandTransform, ContentTransform, FnTransform, MergePipeline, Minifier};
use crate::notifier::ConsoleNotifier;
use crate::registry::{BuildRegistry, BuildRequest};
use crate::task::TaskConstructor;
use crate::types::SourceKind;
use crate::watch::{build_watch_profiles, HashGuard};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - build-file loading
/// - registry / task table / scheduler handle
/// - task construction for every file-set entry
/// - (optional) file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let build_path = PathBuf::from(&args.build_file);
    let build = load_and_validate(&build_path)?;
    let options = BuildOptions::from_build_file(&build, args.production, args.sourcemaps);

    if args.dry_run {
        print_dry_run(&build, &options);
        return Ok(());
    }

    let root = build_root_dir(&build_path);
    let root = root.canonicalize().unwrap_or(root);

    let registry = BuildRegistry::new().into_shared();
    let table = Arc::new(TaskTable::new());

    // Runtime event channel; construction queues into it before the loop
    // starts consuming, so all registration settles first.
    let (rt_tx, rt_rx) = mpsc::unbounded_channel::<RuntimeEvent>();

    let host = Arc::new(SchedulerHandle::new(Arc::clone(&table), rt_tx.clone()));

    let transpiler: Option<Arc<dyn ContentTransform>> = if options.babel_enabled {
        Some(Arc::new(CommandTransform::new(
            "babel",
            build.babel.command.clone(),
            build.babel.args.clone(),
        )))
    } else {
        None
    };

    let pipeline = Arc::new(MergePipeline::new(
        Arc::new(RealFileSystem),
        Arc::new(ConsoleNotifier),
        transpiler,
        options,
    ));

    let constructor = TaskConstructor::new(
        Arc::clone(&registry),
        host.clone() as Arc<dyn task::TaskHost>,
        pipeline,
    );

    for (name, entries) in selected_tasks(&build, args.task.as_deref())? {
        for entry in entries {
            let request = request_from_entry(&root, name, entry, &build, &options)?;
            let queued = constructor.construct(request)?;
            debug!(task = %queued.name, "task constructed and queued");
        }
    }

    // Optional file watcher (disabled in --once mode).
    let _watcher_handle = if !args.once {
        let lists = relativized_watch_lists(&root, &host.watch_lists());
        let profiles = build_watch_profiles(&lists)?;
        let guard = options.use_hash.then(|| Arc::new(HashGuard::new()));
        Some(watch::spawn_watcher(
            root.clone(),
            profiles,
            rt_tx.clone(),
            guard,
        )?)
    } else {
        None
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested);
        });
    }

    info!(tasks = ?table.names(), "construction complete; starting runtime");

    let runtime = Runtime::new(
        table,
        RuntimeOptions {
            exit_when_idle: args.once,
        },
        rt_rx,
        rt_tx,
    );
    runtime.run().await
}

/// Figure out a sensible project root for watching and path resolution.
///
/// - If the build-file path has a non-empty parent (e.g. "conf/Mergewatch.toml"),
///   use that directory.
/// - If it's just a bare filename, fall back to the current working directory.
fn build_root_dir(build_path: &Path) -> PathBuf {
    match build_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Narrow the task map to `--task NAME` when given.
fn selected_tasks<'a>(
    build: &'a BuildFile,
    only: Option<&str>,
) -> Result<Vec<(&'a String, &'a Vec<MergeEntry>)>> {
    match only {
        None => Ok(build.tasks.iter().collect()),
        Some(name) => match build.tasks.get_key_value(name) {
            Some((name, entries)) => Ok(vec![(name, entries)]),
            None => Err(MergewatchError::TaskNotFound(name.to_string())),
        },
    }
}

/// Turn one validated build-file entry into a build request with all paths
/// resolved against the project root.
fn request_from_entry(
    root: &Path,
    task_name: &str,
    entry: &MergeEntry,
    build: &BuildFile,
    options: &BuildOptions,
) -> Result<BuildRequest> {
    Ok(BuildRequest {
        task_name: task_name.to_string(),
        kind: entry.kind,
        files: entry.files.iter().map(|f| resolve(root, f)).collect(),
        output_dir: resolve(root, &entry.output_dir),
        concat_file_name: entry.concat_file_name.clone(),
        minifier: resolve_minifier(build, options, entry.kind)?,
    })
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Pick the minifier a request carries.
///
/// Outside production mode the minify stage never runs, so the request gets a
/// passthrough. In production mode a `[minify.<kind>]` command is required.
fn resolve_minifier(
    build: &BuildFile,
    options: &BuildOptions,
    kind: SourceKind,
) -> Result<Minifier> {
    if !options.production {
        return Ok(Arc::new(FnTransform::passthrough()));
    }

    match build.minify_spec(kind) {
        Some(spec) => Ok(Arc::new(CommandTransform::new(
            format!("minify-{kind}"),
            spec.command.clone(),
            spec.args.clone(),
        ))),
        None => Err(MergewatchError::ConfigError(format!(
            "production build needs a [minify.{kind}] command"
        ))),
    }
}

/// Watch lists rendered relative to the project root, matching how the
/// watcher relativizes event paths before profile matching.
fn relativized_watch_lists(
    root: &Path,
    lists: &[(engine::TaskName, Vec<PathBuf>)],
) -> Vec<(engine::TaskName, Vec<PathBuf>)> {
    lists
        .iter()
        .map(|(name, paths)| {
            let rel = paths
                .iter()
                .map(|p| p.strip_prefix(root).unwrap_or(p).to_path_buf())
                .collect();
            (name.clone(), rel)
        })
        .collect()
}

/// Simple dry-run output: print options and tasks with their file-sets.
fn print_dry_run(build: &BuildFile, options: &BuildOptions) {
    println!("mergewatch dry-run");
    println!("  production = {}", options.production);
    println!("  sourcemaps = {}", options.sourcemaps);
    println!("  babel.enabled = {}", options.babel_enabled);
    println!("  use_hash = {}", options.use_hash);
    println!();

    println!("tasks ({}):", build.tasks.len());
    for (name, entries) in build.tasks.iter() {
        println!("  - {name}");
        for entry in entries {
            println!(
                "      {} -> {:?}/{} ({} files)",
                entry.kind,
                entry.output_dir,
                entry.concat_file_name,
                entry.files.len()
            );
            for file in &entry.files {
                println!("        {:?}", file);
            }
        }
    }

    debug!("dry-run complete (no execution)");
}
