// tests/model_hierarchy.rs

mod common;
use crate::common::builders::project;
use crate::common::{record, TestResult};

use pipetest::errors::PipetestError;
use pipetest::model::{NodeEvent, NodeEventKind, NodeKind, TestResult as RunResult, TestStatus};

fn pass() -> RunResult {
    RunResult {
        status: TestStatus::Pass,
        output: String::new(),
        error: None,
        duration: 0.5,
    }
}

#[test]
fn confirm_exists_creates_module_case_and_method() -> TestResult {
    let mut project = project();
    let log = record(project.events_mut(), &[NodeEventKind::New]);

    let method = project.confirm_exists("pkg.mod.Case.test_a", None)?;
    assert_eq!(method.name, "test_a");
    assert_eq!(method.path, "pkg.mod.Case.test_a");
    assert!(method.active());
    assert!(method.result().is_none());

    let kinds: Vec<(NodeKind, String)> = log
        .lock()
        .unwrap()
        .iter()
        .map(|e| (e.node, e.path.clone()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (NodeKind::Module, "pkg".to_string()),
            (NodeKind::Module, "pkg.mod".to_string()),
            (NodeKind::Case, "pkg.mod.Case".to_string()),
            (NodeKind::Method, "pkg.mod.Case.test_a".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn confirm_exists_is_identity_stable() -> TestResult {
    let mut project = project();
    project.confirm_exists("m.C.t1", None)?;
    project.record_result("m.C.t1", Some("first run".into()), pass())?;

    let log = record(project.events_mut(), &[NodeEventKind::New]);
    let again = project.confirm_exists("m.C.t1", None)?;

    assert_eq!(again.description, "first run");
    assert_eq!(again.result().map(|r| r.status), Some(TestStatus::Pass));
    assert!(log.lock().unwrap().is_empty(), "no node should be re-created");
    assert_eq!(project.methods().len(), 1);
    Ok(())
}

#[test]
fn two_segment_paths_have_no_module() -> TestResult {
    let mut project = project();
    project.confirm_exists("Case.test_x", None)?;

    let case = project.find("Case").ok_or("case missing")?;
    assert_eq!(case.kind(), NodeKind::Case);
    assert_eq!(
        project.find("Case.test_x").map(|n| n.kind()),
        Some(NodeKind::Method)
    );
    Ok(())
}

#[test]
fn confirm_exists_rejects_unusable_paths() {
    let mut project = project();

    for bad in ["lonely", "", "a..b", ".a.b"] {
        match project.confirm_exists(bad, None) {
            Err(PipetestError::InvalidTestPath(_)) => {}
            other => panic!("expected InvalidTestPath for {bad:?}, got {other:?}"),
        }
    }
    assert!(project.methods().is_empty());
}

#[test]
fn confirm_exists_rejects_kind_conflicts() -> TestResult {
    let mut project = project();
    project.confirm_exists("m.C.t1", None)?;

    // "m.C" is a case; using it as a module of a deeper path is a conflict.
    match project.confirm_exists("m.C.t1.extra", None) {
        Err(PipetestError::InvalidTestPath(msg)) => assert!(msg.contains("m.C")),
        other => panic!("expected InvalidTestPath, got {other:?}"),
    }
    Ok(())
}

#[test]
fn deactivating_a_case_cascades_and_recomputes_module() -> TestResult {
    let mut project = project();
    project.confirm_exists("m.A.t1", None)?;
    project.confirm_exists("m.A.t2", None)?;
    project.confirm_exists("m.B.t3", None)?;

    project.set_active("m.A", false)?;
    assert!(!project.method("m.A.t1").ok_or("t1")?.active());
    assert!(!project.method("m.A.t2").ok_or("t2")?.active());
    assert!(!project.find("m.A").ok_or("A")?.active());
    // B is still active, so the module stays active.
    assert!(project.find("m").ok_or("m")?.active());

    project.set_active("m.B", false)?;
    assert!(!project.find("m").ok_or("m")?.active());
    assert!(!project.active());
    Ok(())
}

#[test]
fn reactivating_one_method_flips_ancestors_back() -> TestResult {
    let mut project = project();
    project.confirm_exists("m.C.t1", None)?;
    project.confirm_exists("m.C.t2", None)?;
    project.set_all_active(false);
    assert!(!project.active());

    let log = record(project.events_mut(), &[NodeEventKind::Active]);
    project.set_active("m.C.t2", true)?;

    assert!(project.method("m.C.t2").ok_or("t2")?.active());
    assert!(!project.method("m.C.t1").ok_or("t1")?.active());
    assert!(project.find("m.C").ok_or("C")?.active());
    assert!(project.find("m").ok_or("m")?.active());
    assert!(project.active());

    let events: Vec<NodeEvent> = log.lock().unwrap().clone();
    let nodes: Vec<NodeKind> = events.iter().map(|e| e.node).collect();
    assert_eq!(
        nodes,
        vec![
            NodeKind::Method,
            NodeKind::Case,
            NodeKind::Module,
            NodeKind::Project
        ]
    );
    Ok(())
}

#[test]
fn set_active_on_unknown_path_fails() {
    let mut project = project();
    assert!(matches!(
        project.set_active("nope.Case", false),
        Err(PipetestError::TestNotFound(_))
    ));
}

#[test]
fn refresh_purges_unseen_nodes_and_empty_containers() -> TestResult {
    let mut project = project();
    project.refresh(["m.A.t1", "m.A.t2", "n.B.t3"], 1)?;
    assert_eq!(project.methods().len(), 3);

    project.refresh(["m.A.t1"], 2)?;

    assert!(project.method("m.A.t1").is_some());
    assert!(project.find("m.A.t2").is_none());
    assert!(project.find("n.B").is_none());
    assert!(project.find("n").is_none(), "empty module is swept");
    assert_eq!(project.method("m.A.t1").ok_or("t1")?.timestamp(), Some(2));
    Ok(())
}

#[test]
fn active_labels_name_the_shortest_selection() -> TestResult {
    let mut project = project();
    project.confirm_exists("m.A.t1", None)?;
    project.confirm_exists("m.A.t2", None)?;
    project.confirm_exists("m.B.t3", None)?;
    project.confirm_exists("n.C.t4", None)?;

    assert_eq!(project.active_labels(), Some(vec![]));

    project.set_active("n", false)?;
    project.set_active("m.A.t2", false)?;
    assert_eq!(
        project.active_labels(),
        Some(vec!["m.A.t1".to_string(), "m.B".to_string()])
    );
    assert_eq!(project.active_test_count(), 2);

    project.set_all_active(false);
    assert_eq!(project.active_labels(), None);
    Ok(())
}

#[test]
fn record_result_updates_method_and_publishes_status_update() -> TestResult {
    let mut project = project();
    project.confirm_exists("m.C.t1", None)?;
    let log = record(project.events_mut(), &[NodeEventKind::StatusUpdate]);

    project.record_result(
        "m.C.t1",
        Some("does a thing".into()),
        RunResult {
            status: TestStatus::Fail,
            output: "out".into(),
            error: Some("boom".into()),
            duration: 2.0,
        },
    )?;

    let method = project.method("m.C.t1").ok_or("missing")?;
    assert_eq!(method.description, "does a thing");
    let result = method.result().ok_or("no result")?;
    assert_eq!(result.status, TestStatus::Fail);
    assert_eq!(result.error.as_deref(), Some("boom"));

    let events = log.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].path, "m.C.t1");
    Ok(())
}

#[test]
fn commandline_puts_labels_after_testdir() {
    let project = project();
    let argv = project.execute_commandline(&["m.C".to_string()], std::path::Path::new("tests"));
    assert_eq!(argv, vec!["executor", "--testdir", "tests", "m.C"]);
}
