//! End-to-end builds with real processes and file modification times.
#![cfg(unix)]

use camino::Utf8PathBuf;
use std::fs::{File, FileTimes};
use std::time::{Duration, SystemTime};
use stepbuild::build::{Engine, FailurePolicy, RecordingReporter};
use stepbuild::graph::StepGraph;
use stepbuild::result::StepError;
use stepbuild::scanner::{scan_auto_dependencies, DirectiveSyntax};
use stepbuild::step::{FsTimestamps, T_OUT};
use stepbuild::utils::process::ProcessRunner;

fn engine() -> Engine<ProcessRunner, FsTimestamps, RecordingReporter> {
    Engine::with_parts(ProcessRunner::new(), FsTimestamps, RecordingReporter::new())
}

fn set_mtime(path: &Utf8PathBuf, time: SystemTime) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_times(FileTimes::new().set_modified(time)).unwrap();
}

#[tokio::test]
async fn touch_step_runs_once_then_is_up_to_date() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let source = root.join("main.c");
    let header = root.join("util.h");
    let output = root.join("main.o");
    std::fs::write(&source, "#include \"util.h\"\nint main(void) { return 0; }\n").unwrap();
    std::fs::write(&header, "#define UTIL 1\n").unwrap();

    let past = SystemTime::now() - Duration::from_secs(3600);
    set_mtime(&source, past);
    set_mtime(&header, past);

    let mut graph = StepGraph::new();
    let id = graph.add_step("touch", output.clone()).unwrap();
    graph.step_mut(id).unwrap().add_argument(T_OUT).add_input(source.clone());
    scan_auto_dependencies(&mut graph, id, &DirectiveSyntax::default())
        .await
        .unwrap();

    let mut first = engine();
    assert!(first.build(&graph, id).await.unwrap().ran(id));
    assert!(output.exists());

    let mut second = engine();
    let summary = second.build(&graph, id).await.unwrap();
    assert!(!summary.ran(id));
    assert!(second.reporter().commands.is_empty());

    // The header is a dependency-only input discovered by the scanner.
    set_mtime(&header, SystemTime::now() + Duration::from_secs(3600));
    let mut third = engine();
    assert!(third.build(&graph, id).await.unwrap().ran(id));
}

#[tokio::test]
async fn non_zero_exit_becomes_a_build_failure() {
    let dir = tempfile::tempdir().unwrap();
    let output = Utf8PathBuf::from_path_buf(dir.path().join("never")).unwrap();

    let mut graph = StepGraph::new();
    let id = graph.add_step("false", output).unwrap();

    let mut engine = engine().with_policy(FailurePolicy::AbortOnFirst);
    match engine.build(&graph, id).await {
        Err(StepError::Build(failure)) => assert_eq!(failure.step, id),
        other => panic!("expected build failure, got {:?}", other),
    }
}
