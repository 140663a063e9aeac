// tests/transpile_scope.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use mergewatch::config::BuildOptions;
use mergewatch::fs::RealFileSystem;
use mergewatch::merge::{ContentTransform, FnTransform, MergePipeline};
use mergewatch::registry::FileSet;
use mergewatch_test_utils::builders::BuildRequestBuilder;
use mergewatch_test_utils::fake_host::CollectingNotifier;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

/// A transpiler stand-in that records every unit it receives.
fn recording_transpiler(seen: Arc<Mutex<Vec<String>>>) -> Arc<dyn ContentTransform> {
    Arc::new(FnTransform::new("recorder", move |content: String| {
        seen.lock().unwrap().push(content.clone());
        Ok(content)
    }))
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn transpiler_receives_the_concatenated_unit() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;

    // A construct that is only syntactically complete after concatenation:
    // the function opens in one file and closes in the other.
    let head = write_file(&dir, "head.js", "function half() {\n");
    let tail = write_file(&dir, "tail.js", "}\n");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let options = BuildOptions {
        babel_enabled: true,
        ..BuildOptions::default()
    };
    let pipeline = MergePipeline::new(
        Arc::new(RealFileSystem),
        Arc::new(CollectingNotifier::new()),
        Some(recording_transpiler(Arc::clone(&seen))),
        options,
    );

    let request = BuildRequestBuilder::new("scripts")
        .file(&head)
        .file(&tail)
        .output_dir(dir.path().join("dist"))
        .concat_file_name("app.js")
        .build();
    pipeline.run(&FileSet::from(&request), &request)?;

    // Exactly one transform call, fed the whole merged unit, not one call
    // per input file.
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], "function half() {\n}\n");

    Ok(())
}

#[test]
fn non_scripts_task_is_never_transpiled() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let x = write_file(&dir, "x.css", "body {}\n");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let options = BuildOptions {
        babel_enabled: true,
        ..BuildOptions::default()
    };
    let pipeline = MergePipeline::new(
        Arc::new(RealFileSystem),
        Arc::new(CollectingNotifier::new()),
        Some(recording_transpiler(Arc::clone(&seen))),
        options,
    );

    let request = BuildRequestBuilder::new("styles")
        .file(&x)
        .output_dir(dir.path().join("dist"))
        .concat_file_name("all.css")
        .build();
    pipeline.run(&FileSet::from(&request), &request)?;

    assert!(seen.lock().unwrap().is_empty());

    Ok(())
}

#[test]
fn babel_disabled_skips_transpilation_for_scripts() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let a = write_file(&dir, "a.js", "var a;\n");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let pipeline = MergePipeline::new(
        Arc::new(RealFileSystem),
        Arc::new(CollectingNotifier::new()),
        Some(recording_transpiler(Arc::clone(&seen))),
        BuildOptions::default(),
    );

    let request = BuildRequestBuilder::new("scripts")
        .file(&a)
        .output_dir(dir.path().join("dist"))
        .concat_file_name("app.js")
        .build();
    pipeline.run(&FileSet::from(&request), &request)?;

    assert!(seen.lock().unwrap().is_empty());

    Ok(())
}
