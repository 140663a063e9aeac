// tests/merge_pipeline.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use mergewatch::config::BuildOptions;
use mergewatch::errors::MergewatchError;
use mergewatch::fs::RealFileSystem;
use mergewatch::merge::MergePipeline;
use mergewatch::registry::{BuildRequest, FileSet};
use mergewatch_test_utils::builders::{uppercase_minifier, BuildRequestBuilder};
use mergewatch_test_utils::fake_host::CollectingNotifier;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn pipeline_with(
    options: BuildOptions,
    notifier: Arc<CollectingNotifier>,
) -> MergePipeline {
    MergePipeline::new(Arc::new(RealFileSystem), notifier, None, options)
}

fn run_request(
    options: BuildOptions,
    notifier: Arc<CollectingNotifier>,
    request: &BuildRequest,
) -> mergewatch::errors::Result<mergewatch::merge::MergeOutcome> {
    let pipeline = pipeline_with(options, notifier);
    let set = FileSet::from(request);
    pipeline.run(&set, request)
}

#[test]
fn concatenation_preserves_listed_order() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let a = write_file(&dir, "a.js", "AAA\n");
    let b = write_file(&dir, "b.js", "BBB\n");
    let c = write_file(&dir, "c.js", "CCC\n");

    for files in [vec![&a, &b, &c], vec![&c, &a, &b]] {
        let request = files
            .iter()
            .fold(BuildRequestBuilder::new("scripts"), |builder, f| {
                builder.file((*f).clone())
            })
            .output_dir(dir.path().join("dist"))
            .concat_file_name("app.js")
            .build();

        run_request(BuildOptions::default(), Arc::new(CollectingNotifier::new()), &request)?;

        let expected: String = files
            .iter()
            .map(|f| std::fs::read_to_string(f).unwrap())
            .collect();
        let merged = std::fs::read_to_string(dir.path().join("dist/app.js"))?;
        assert_eq!(merged, expected);
    }

    Ok(())
}

#[test]
fn stale_artifact_is_fully_replaced() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let a = write_file(&dir, "a.css", "fresh\n");

    // A previous run's output, longer than the new one so any partial
    // overwrite would leave mixed content behind.
    let dist = dir.path().join("dist");
    std::fs::create_dir_all(&dist)?;
    std::fs::write(dist.join("all.css"), "stale stale stale stale stale\n")?;

    let request = BuildRequestBuilder::new("styles")
        .file(a)
        .output_dir(&dist)
        .concat_file_name("all.css")
        .build();
    run_request(BuildOptions::default(), Arc::new(CollectingNotifier::new()), &request)?;

    let merged = std::fs::read_to_string(dist.join("all.css"))?;
    assert_eq!(merged, "fresh\n");

    Ok(())
}

#[test]
fn production_toggle_only_adds_minification() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let a = write_file(&dir, "a.js", "var a = 1;\n");
    let b = write_file(&dir, "b.js", "var b = 2;\n");

    let request = BuildRequestBuilder::new("scripts")
        .file(&a)
        .file(&b)
        .output_dir(dir.path().join("dist"))
        .concat_file_name("app.js")
        .minifier(uppercase_minifier())
        .build();

    run_request(BuildOptions::default(), Arc::new(CollectingNotifier::new()), &request)?;
    let plain = std::fs::read_to_string(dir.path().join("dist/app.js"))?;
    assert_eq!(plain, "var a = 1;\nvar b = 2;\n");

    let production = BuildOptions {
        production: true,
        ..BuildOptions::default()
    };
    run_request(production, Arc::new(CollectingNotifier::new()), &request)?;
    let minified = std::fs::read_to_string(dir.path().join("dist/app.js"))?;
    assert_eq!(minified, plain.to_uppercase());

    Ok(())
}

#[test]
fn development_merge_emits_no_map_and_notifies_once() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let a = write_file(&dir, "a.js", "first\n");
    let b = write_file(&dir, "b.js", "second\n");

    let notifier = Arc::new(CollectingNotifier::new());
    let request = BuildRequestBuilder::new("scripts")
        .file(&a)
        .file(&b)
        .output_dir(dir.path().join("dist"))
        .concat_file_name("app.js")
        .build();

    run_request(BuildOptions::default(), Arc::clone(&notifier), &request)?;

    let merged = std::fs::read_to_string(dir.path().join("dist/app.js"))?;
    assert_eq!(merged, "first\nsecond\n");
    assert!(!dir.path().join("dist/app.js.map").exists());
    assert_eq!(notifier.messages(), vec!["Files merged!".to_string()]);

    Ok(())
}

#[test]
fn sourcemaps_emit_map_file_and_comment() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let a = write_file(&dir, "a.js", "one\n");
    let b = write_file(&dir, "b.js", "two\n");

    let options = BuildOptions {
        sourcemaps: true,
        ..BuildOptions::default()
    };
    let request = BuildRequestBuilder::new("scripts")
        .file(&a)
        .file(&b)
        .output_dir(dir.path().join("dist"))
        .concat_file_name("app.js")
        .build();

    let outcome = run_request(options, Arc::new(CollectingNotifier::new()), &request)?;
    assert_eq!(outcome.artifact_path, dir.path().join("dist/app.js"));
    assert_eq!(outcome.map_path, Some(dir.path().join("dist/app.js.map")));
    assert!(outcome.bytes_written > 0);

    let merged = std::fs::read_to_string(dir.path().join("dist/app.js"))?;
    assert!(merged.starts_with("one\ntwo\n"));
    assert!(merged.contains("//# sourceMappingURL=app.js.map"));

    let map: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(
        dir.path().join("dist/app.js.map"),
    )?)?;
    assert_eq!(map["version"], 3);
    assert_eq!(map["file"], "app.js");
    assert_eq!(map["sources"].as_array().unwrap().len(), 2);

    Ok(())
}

#[test]
fn missing_input_fails_without_notification() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let a = write_file(&dir, "a.js", "present\n");

    let notifier = Arc::new(CollectingNotifier::new());
    let request = BuildRequestBuilder::new("scripts")
        .file(&a)
        .file(dir.path().join("gone.js"))
        .output_dir(dir.path().join("dist"))
        .concat_file_name("app.js")
        .build();

    let err = run_request(BuildOptions::default(), Arc::clone(&notifier), &request)
        .unwrap_err();
    assert!(matches!(err, MergewatchError::MissingInput(_)));
    assert!(notifier.messages().is_empty());
    assert!(!dir.path().join("dist/app.js").exists());

    Ok(())
}
