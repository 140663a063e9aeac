// tests/runtime_scheduler.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use mergewatch::engine::{
    Runtime, RuntimeEvent, RuntimeOptions, SchedulerHandle, TaskTable,
};
use mergewatch::errors::MergewatchError;
use mergewatch::task::{TaskBody, TaskHost};

type TestResult = Result<(), Box<dyn Error>>;

/// A body that bumps a counter and optionally dawdles before finishing.
fn counting_body(counter: Arc<AtomicUsize>, delay: Duration) -> TaskBody {
    Arc::new(move || {
        let counter = Arc::clone(&counter);
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(())
        })
    })
}

#[tokio::test]
async fn once_mode_runs_every_queued_task_and_exits() -> TestResult {
    init_tracing();

    let table = Arc::new(TaskTable::new());
    let (rt_tx, rt_rx) = mpsc::unbounded_channel::<RuntimeEvent>();
    let host = SchedulerHandle::new(Arc::clone(&table), rt_tx.clone());

    let scripts_runs = Arc::new(AtomicUsize::new(0));
    let styles_runs = Arc::new(AtomicUsize::new(0));

    host.define_task(
        "scripts",
        counting_body(Arc::clone(&scripts_runs), Duration::ZERO),
    )?;
    host.define_task(
        "styles",
        counting_body(Arc::clone(&styles_runs), Duration::ZERO),
    )?;
    host.queue_task("scripts")?;
    host.queue_task("styles")?;

    let runtime = Runtime::new(
        table,
        RuntimeOptions {
            exit_when_idle: true,
        },
        rt_rx,
        rt_tx,
    );
    timeout(Duration::from_secs(3), runtime.run()).await??;

    assert_eq!(scripts_runs.load(Ordering::SeqCst), 1);
    assert_eq!(styles_runs.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn triggers_during_a_run_coalesce_into_one_rerun() -> TestResult {
    init_tracing();

    let table = Arc::new(TaskTable::new());
    let (rt_tx, rt_rx) = mpsc::unbounded_channel::<RuntimeEvent>();
    let host = SchedulerHandle::new(Arc::clone(&table), rt_tx.clone());

    let runs = Arc::new(AtomicUsize::new(0));
    host.define_task(
        "scripts",
        counting_body(Arc::clone(&runs), Duration::from_millis(50)),
    )?;

    // Three triggers land before the first invocation can finish: the first
    // starts a run, the other two collapse into a single pending re-run.
    host.queue_task("scripts")?;
    host.queue_task("scripts")?;
    host.queue_task("scripts")?;

    let runtime = Runtime::new(
        table,
        RuntimeOptions {
            exit_when_idle: true,
        },
        rt_rx,
        rt_tx,
    );
    timeout(Duration::from_secs(3), runtime.run()).await??;

    assert_eq!(runs.load(Ordering::SeqCst), 2);

    Ok(())
}

#[tokio::test]
async fn redefining_a_task_replaces_its_body() -> TestResult {
    init_tracing();

    let table = Arc::new(TaskTable::new());
    let (rt_tx, rt_rx) = mpsc::unbounded_channel::<RuntimeEvent>();
    let host = SchedulerHandle::new(Arc::clone(&table), rt_tx.clone());

    let old_runs = Arc::new(AtomicUsize::new(0));
    let new_runs = Arc::new(AtomicUsize::new(0));

    host.define_task("scripts", counting_body(Arc::clone(&old_runs), Duration::ZERO))?;
    host.define_task("scripts", counting_body(Arc::clone(&new_runs), Duration::ZERO))?;
    host.queue_task("scripts")?;

    let runtime = Runtime::new(
        table,
        RuntimeOptions {
            exit_when_idle: true,
        },
        rt_rx,
        rt_tx,
    );
    timeout(Duration::from_secs(3), runtime.run()).await??;

    assert_eq!(old_runs.load(Ordering::SeqCst), 0);
    assert_eq!(new_runs.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn queueing_an_undefined_task_fails() -> TestResult {
    init_tracing();

    let table = Arc::new(TaskTable::new());
    let (rt_tx, _rt_rx) = mpsc::unbounded_channel::<RuntimeEvent>();
    let host = SchedulerHandle::new(table, rt_tx);

    let err = host.queue_task("nope").unwrap_err();
    assert!(matches!(err, MergewatchError::TaskNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn failed_body_still_lets_the_runtime_finish() -> TestResult {
    init_tracing();

    let table = Arc::new(TaskTable::new());
    let (rt_tx, rt_rx) = mpsc::unbounded_channel::<RuntimeEvent>();
    let host = SchedulerHandle::new(Arc::clone(&table), rt_tx.clone());

    let failing: TaskBody = Arc::new(|| {
        Box::pin(async {
            Err(MergewatchError::ConfigError("boom".to_string()))
        })
    });
    host.define_task("broken", failing)?;
    host.queue_task("broken")?;

    let runtime = Runtime::new(
        table,
        RuntimeOptions {
            exit_when_idle: true,
        },
        rt_rx,
        rt_tx,
    );
    timeout(Duration::from_secs(3), runtime.run()).await??;

    Ok(())
}
