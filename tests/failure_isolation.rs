// tests/failure_isolation.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use mergewatch::config::BuildOptions;
use mergewatch::fs::RealFileSystem;
use mergewatch::merge::MergePipeline;
use mergewatch::registry::BuildRegistry;
use mergewatch::task::{TaskConstructor, TaskHost};
use mergewatch_test_utils::builders::BuildRequestBuilder;
use mergewatch_test_utils::fake_host::{CollectingNotifier, FakeHost};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn failed_file_set_does_not_roll_back_its_sibling() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let good = write_file(&dir, "good.js", "good\n");
    let dist = dir.path().join("dist");

    let registry = BuildRegistry::new().into_shared();
    let host = Arc::new(FakeHost::new());
    let notifier = Arc::new(CollectingNotifier::new());
    let pipeline = Arc::new(MergePipeline::new(
        Arc::new(RealFileSystem),
        Arc::clone(&notifier) as Arc<dyn mergewatch::notifier::Notifier>,
        None,
        BuildOptions::default(),
    ));
    let constructor = TaskConstructor::new(
        Arc::clone(&registry),
        Arc::clone(&host) as Arc<dyn TaskHost>,
        pipeline,
    );

    constructor.construct(
        BuildRequestBuilder::new("scripts")
            .file(&good)
            .output_dir(&dist)
            .concat_file_name("good.js")
            .build(),
    )?;
    constructor.construct(
        BuildRequestBuilder::new("scripts")
            .file(dir.path().join("missing.js"))
            .output_dir(&dist)
            .concat_file_name("broken.js")
            .build(),
    )?;

    // The join reports the task failed even though one sibling succeeded.
    let result = host.invoke("scripts")?.await;
    assert!(result.is_err());

    // The healthy file-set completed and notified; the failed one did not.
    assert_eq!(std::fs::read_to_string(dist.join("good.js"))?, "good\n");
    assert!(!dist.join("broken.js").exists());
    assert_eq!(notifier.messages(), vec!["Files merged!".to_string()]);

    Ok(())
}
