// tests/encoder_output.rs

mod common;
use crate::common::builders::project;
use crate::common::{init_tracing, TestResult};

use std::fmt::Write as _;

use pipetest::decoder::{Flow, FrameDecoder, RunEvent};
use pipetest::encoder::{
    describe, matches_label, select_tests, trim_docstring, Outcome, PathStyle, PipedResult,
    PipedRunner, SubFailure, Suite, TestInfo, NO_DESCRIPTION,
};
use pipetest::model::TestStatus;
use pipetest::protocol::clean_line;
use pipetest_test_utils::fake_suite::{fixed_clock, FnTest};

fn run_to_string(suites: &[Suite]) -> Result<(usize, String), Box<dyn std::error::Error>> {
    let mut runner = PipedRunner::with_clock(Vec::new(), fixed_clock);
    let reported = runner.run(suites)?;
    Ok((reported, String::from_utf8(runner.into_inner())?))
}

/// Decode encoder output the way the supervisor does.
fn decode(output: &str) -> (Flow, Vec<RunEvent>, pipetest::model::Project) {
    let mut project = project();
    let mut decoder = FrameDecoder::new(0);
    let mut events = Vec::new();
    let lines: Vec<String> = output
        .split_inclusive('\n')
        .map(|l| clean_line(l.as_bytes()))
        .collect();
    let flow = decoder.feed_lines(&lines, &mut project, &mut events);
    (flow, events, project)
}

#[test]
fn single_passing_test_produces_the_documented_stream() -> TestResult {
    init_tracing();
    let suites = vec![Suite::new("m.C").with_test(FnTest::passing("m.C.t1"))];

    let (reported, output) = run_to_string(&suites)?;

    assert_eq!(reported, 1);
    assert_eq!(
        output,
        "\x02\n\
         {\"path\":\"m.C.t1\",\"start_time\":1.0}\n\
         {\"status\":\"OK\",\"end_time\":1.0,\"description\":\"No description\",\"output\":\"\"}\n\
         \x03\n"
    );
    Ok(())
}

#[test]
fn every_outcome_round_trips_through_the_decoder() -> TestResult {
    let suites = vec![
        Suite::new("m.C")
            .with_test(FnTest::passing("m.C.pass"))
            .with_test(FnTest::returning("m.C.fail", Outcome::Failure("assert 1 == 2".into())))
            .with_test(FnTest::returning("m.C.error", Outcome::Error("KeyError".into())))
            .with_test(FnTest::returning("m.C.skip", Outcome::Skip("later".into())))
            .with_test(FnTest::returning("m.C.xfail", Outcome::ExpectedFailure("known".into())))
            .with_test(FnTest::returning("m.C.xpass", Outcome::UnexpectedSuccess)),
    ];

    let (_, output) = run_to_string(&suites)?;
    let (flow, events, project) = decode(&output);

    assert_eq!(flow, Flow::Finished);
    let ends: Vec<(String, TestStatus)> = events
        .iter()
        .filter_map(|e| match e {
            RunEvent::TestEnd {
                test_path, result, ..
            } => Some((test_path.clone(), *result)),
            _ => None,
        })
        .collect();
    assert_eq!(
        ends,
        vec![
            ("m.C.pass".to_string(), TestStatus::Pass),
            ("m.C.fail".to_string(), TestStatus::Fail),
            ("m.C.error".to_string(), TestStatus::Error),
            ("m.C.skip".to_string(), TestStatus::Skip),
            ("m.C.xfail".to_string(), TestStatus::ExpectedFail),
            ("m.C.xpass".to_string(), TestStatus::UnexpectedSuccess),
        ]
    );

    let skip = project.method("m.C.skip").and_then(|m| m.result()).ok_or("skip")?;
    assert_eq!(skip.error.as_deref(), Some("Skipped: later"));
    Ok(())
}

#[test]
fn test_output_is_captured_into_the_result_frame() -> TestResult {
    let test = FnTest::new("m.C.chatty", |ctx| {
        let _ = writeln!(ctx, "hello from the test");
        Outcome::Success
    })
    .with_doc("Says hello.\n\n    Twice, if asked.\n");
    let suites = vec![Suite::new("m.C").with_test(test)];

    let (_, output) = run_to_string(&suites)?;
    let (_, _, project) = decode(&output);

    let method = project.method("m.C.chatty").ok_or("missing")?;
    assert_eq!(method.description, "Says hello.\n\nTwice, if asked.");
    assert_eq!(
        method.result().map(|r| r.output.as_str()),
        Some("hello from the test\n")
    );
    Ok(())
}

#[test]
fn subtests_share_one_record() -> TestResult {
    let test = FnTest::new("m.C.table", |ctx| {
        ctx.subtest("row 1", |_| Ok(()));
        ctx.subtest("row 2", |_| Err(SubFailure::Fail("row 2 mismatch".into())));
        ctx.subtest("row 3", |_| Err(SubFailure::Error("row 3 exploded".into())));
        Outcome::Success
    });
    let suites = vec![Suite::new("m.C").with_test(test)];

    let (_, output) = run_to_string(&suites)?;

    // Start frame plus three sub-result lines; no separate final line.
    let frame_lines = output.lines().filter(|l| l.starts_with('{')).count();
    assert_eq!(frame_lines, 4);

    let (flow, _, project) = decode(&output);
    assert_eq!(flow, Flow::Finished);
    let result = project.method("m.C.table").and_then(|m| m.result()).ok_or("missing")?;
    assert_eq!(result.status, TestStatus::Error);
    assert_eq!(result.error.as_deref(), Some("row 2 mismatch\n\nrow 3 exploded"));
    Ok(())
}

#[test]
fn passing_subtests_are_followed_by_the_final_result() -> TestResult {
    let test = FnTest::new("m.C.table", |ctx| {
        ctx.subtest("row 1", |_| Ok(()));
        Outcome::Success
    });
    let suites = vec![Suite::new("m.C").with_test(test)];

    let (_, output) = run_to_string(&suites)?;

    let frame_lines = output.lines().filter(|l| l.starts_with('{')).count();
    assert_eq!(frame_lines, 3);
    let (_, _, project) = decode(&output);
    assert_eq!(
        project.method("m.C.table").and_then(|m| m.result()).map(|r| r.status),
        Some(TestStatus::Pass)
    );
    Ok(())
}

#[test]
fn failing_suite_setup_reports_every_test_as_error() -> TestResult {
    let suites = vec![
        Suite::new("m.Db")
            .with_set_up(|| Err("database unreachable".to_string()))
            .with_test(FnTest::passing("m.Db.t1"))
            .with_test(FnTest::passing("m.Db.t2")),
        Suite::new("m.Ok").with_test(FnTest::passing("m.Ok.t3")),
    ];

    let (reported, output) = run_to_string(&suites)?;
    assert_eq!(reported, 3);

    let (flow, events, project) = decode(&output);
    assert_eq!(flow, Flow::Finished);
    let starts = events
        .iter()
        .filter(|e| matches!(e, RunEvent::TestStart { .. }))
        .count();
    assert_eq!(starts, 3, "a start frame is synthesized for each errored test");

    for path in ["m.Db.t1", "m.Db.t2"] {
        let result = project.method(path).and_then(|m| m.result()).ok_or(path)?;
        assert_eq!(result.status, TestStatus::Error);
        assert_eq!(
            result.error.as_deref(),
            Some("Suite setup for m.Db failed: database unreachable")
        );
    }
    assert_eq!(
        project.method("m.Ok.t3").and_then(|m| m.result()).map(|r| r.status),
        Some(TestStatus::Pass)
    );
    Ok(())
}

#[test]
fn error_outside_a_test_synthesizes_a_start_frame() -> TestResult {
    let mut result = PipedResult::with_clock(Vec::new(), fixed_clock);
    let info = TestInfo::new("m.C.setup");

    result.add_error(&info, "fixture failed", "")?;
    assert!(result.current_test().is_none());
    result.stop_run()?;

    let output = String::from_utf8(result.into_inner())?;
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "\x02");
    assert!(lines[1].contains("\"path\":\"m.C.setup\""));
    assert!(lines[2].contains("\"status\":\"E\""));
    assert!(lines[2].contains("\"error\":\"fixture failed\""));
    assert_eq!(lines[3], "\x03");
    Ok(())
}

#[test]
fn empty_run_is_just_the_end_marker() -> TestResult {
    let (reported, output) = run_to_string(&[])?;
    assert_eq!(reported, 0);
    assert_eq!(output, "\x03\n");

    let (flow, events, _) = decode(&output);
    assert_eq!(flow, Flow::Finished);
    assert!(events.is_empty());
    Ok(())
}

#[test]
fn docstrings_are_dedented_and_trimmed() {
    assert_eq!(
        trim_docstring("\n    Check the thing.\n\n    More detail\n      indented\n    "),
        "Check the thing.\n\nMore detail\n  indented"
    );
    assert_eq!(trim_docstring("  one line  "), "one line");
    assert_eq!(trim_docstring("Summary.\n\tTabbed"), "Summary.\nTabbed");
    assert_eq!(describe(None), NO_DESCRIPTION);
    assert_eq!(describe(Some("   \n  ")), NO_DESCRIPTION);
}

#[test]
fn package_path_style_keeps_package_case_and_method() -> TestResult {
    assert_eq!(
        PathStyle::Package.apply("app.tests.test_views.ViewCase.test_get"),
        "app.ViewCase.test_get"
    );
    assert_eq!(PathStyle::Package.apply("m.C.t1"), "m.C.t1");
    assert_eq!(PathStyle::Package.apply("tests.C.t1"), "tests.C.t1");
    assert_eq!(PathStyle::Full.apply("app.tests.x.C.t"), "app.tests.x.C.t");

    let suites = vec![Suite::new("app").with_test(FnTest::passing("app.tests.mod.C.t1"))];
    let mut runner =
        PipedRunner::with_clock(Vec::new(), fixed_clock).with_path_style(PathStyle::Package);
    runner.run(&suites)?;
    let output = String::from_utf8(runner.into_inner())?;

    let (_, _, project) = decode(&output);
    assert!(project.method("app.C.t1").is_some());
    Ok(())
}

#[test]
fn failed_subtests_carry_the_full_output_on_the_last_line() -> TestResult {
    let test = FnTest::new("m.C.table", |ctx| {
        ctx.subtest("row 1", |_| Err(SubFailure::Fail("bad".into())));
        let _ = write!(ctx, "after the rows");
        Outcome::Success
    });
    let suites = vec![Suite::new("m.C").with_test(test)];

    let (_, output) = run_to_string(&suites)?;
    let (_, _, project) = decode(&output);

    let result = project.method("m.C.table").and_then(|m| m.result()).ok_or("missing")?;
    assert_eq!(result.output, "after the rows");
    Ok(())
}

#[test]
fn labels_select_by_module_case_or_id() {
    assert!(matches_label("m.C.t1", "m"));
    assert!(matches_label("m.C.t1", "m.C"));
    assert!(matches_label("m.C.t1", "m.C.t1"));
    assert!(!matches_label("m.C.t1", "m.D"));
    assert!(!matches_label("m.C.t1", "mod"));
    assert!(!matches_label("m.C.t1", "m.C.t2"));
}

#[test]
fn select_tests_drops_unselected_tests_and_empty_suites() {
    let mut suites = vec![
        Suite::new("m.C")
            .with_test(FnTest::passing("m.C.t1"))
            .with_test(FnTest::passing("m.C.t2")),
        Suite::new("n.D").with_test(FnTest::passing("n.D.t3")),
    ];

    select_tests(&mut suites, &["m.C.t2".to_string()]);

    assert_eq!(suites.len(), 1);
    assert_eq!(suites[0].test_ids(), vec!["m.C.t2"]);

    let mut untouched = vec![Suite::new("n.D").with_test(FnTest::passing("n.D.t3"))];
    select_tests(&mut untouched, &[]);
    assert_eq!(untouched[0].len(), 1);
}
