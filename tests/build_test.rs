//! Integration tests for `cdtdevel build` command
//!
//! - Missing target is a user error reported before any build
//! - Single language builds are fail-fast
//! - `build all` attempts every language and reports every failure
//! - Empty task lists succeed with a warning
//! - Task output is kept in the build log

#![cfg(unix)]

mod common;

use common::{
    stderr, stdout, TestProject, EMPTY_LANGUAGE, FAILING_LANGUAGE, WRITING_LANGUAGE,
};

#[test]
fn test_build_without_target_fails() {
    let project = TestProject::with_manifest();

    let output = project.run(&["build"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("missing argument 'all' or language to build"));
}

#[test]
fn test_build_without_target_does_not_need_manifest() {
    let project = TestProject::new();

    let output = project.run(&["build"]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("missing argument"));
    assert!(!err.contains("cdtdevel.toml"));
}

#[test]
fn test_build_without_manifest_fails() {
    let project = TestProject::new();

    let output = project.run(&["build", "all"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("No cdtdevel.toml found"));
}

#[test]
fn test_build_single_language() {
    let project = TestProject::with_manifest();
    project.create_language("go", WRITING_LANGUAGE);

    let output = project.run(&["build", "go"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(project.read_file("implementations/go/built.txt"), "go shared");
    assert!(stdout(&output).contains("Built go"));
}

#[test]
fn test_invalid_language_directory_does_not_block_others() {
    let project = TestProject::with_manifest();
    project.create_language("go", WRITING_LANGUAGE);
    project.create_language("my lang", WRITING_LANGUAGE);

    let output = project.run(&["build", "go"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("skipping language directory"));
    assert!(project.file_exists("implementations/go/built.txt"));
}

#[test]
fn test_build_unknown_language() {
    let project = TestProject::with_manifest();
    project.create_language("go", WRITING_LANGUAGE);

    let output = project.run(&["build", "cobol"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("no libraries loaded for language cobol"));
    assert!(!project.file_exists("implementations/go/built.txt"));
}

#[test]
fn test_build_single_language_stops_at_first_failure() {
    let project = TestProject::with_manifest();
    project.create_language("c", FAILING_LANGUAGE);

    let output = project.run(&["build", "c"]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Task 'explode' failed with exit code 7"), "stderr: {err}");
    assert!(err.contains("exploded"));
    assert!(project.file_exists("implementations/c/first.txt"));
    assert!(!project.file_exists("implementations/c/third.txt"));
}

#[test]
fn test_build_all_attempts_every_language() {
    let project = TestProject::with_manifest();
    project.create_language("a", FAILING_LANGUAGE);
    project.create_language("b", WRITING_LANGUAGE);
    project.create_language("c", FAILING_LANGUAGE);

    let output = project.run(&["build", "all"]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("2 languages failed to build"), "stderr: {err}");
    assert!(err.contains("a: Task 'explode' failed"));
    assert!(err.contains("c: Task 'explode' failed"));
    assert_eq!(project.read_file("implementations/b/built.txt"), "b shared");
    assert!(project.file_exists("implementations/a/first.txt"));
    assert!(project.file_exists("implementations/c/first.txt"));
}

#[test]
fn test_build_all_json_summary() {
    let project = TestProject::with_manifest();
    project.create_language("a", FAILING_LANGUAGE);
    project.create_language("b", WRITING_LANGUAGE);

    let output = project.run(&["--json", "build", "all"]);

    assert!(!output.status.success());
    let value: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("stdout should be JSON");
    assert_eq!(value["success"], false);
    assert_eq!(value["built"], serde_json::json!(["b"]));
    assert_eq!(value["failed"][0]["language"], "a");
}

#[test]
fn test_build_all_empty_workspace_succeeds() {
    let project = TestProject::with_manifest();

    let output = project.run(&["build", "all"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("0 built, 0 failed"));
}

#[test]
fn test_empty_task_list_warns_and_succeeds() {
    let project = TestProject::with_manifest();
    project.create_language("empty", EMPTY_LANGUAGE);

    let output = project.run(&["build", "empty"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("nothing to build"));
}

#[test]
fn test_task_output_is_logged() {
    let project = TestProject::with_manifest();
    project.create_language(
        "go",
        "[build]\ntasks = [{ name = \"greet\", run = \"sh\", args = [\"-c\", \"echo hello from go\"] }]\n",
    );

    let output = project.run(&["build", "go"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let log = project.read_file("build/logs/go.log");
    assert!(log.contains("greet"));
    assert!(log.contains("hello from go"));
}

#[test]
fn test_quiet_build_prints_nothing_on_success() {
    let project = TestProject::with_manifest();
    project.create_language("go", WRITING_LANGUAGE);

    let output = project.run(&["-q", "build", "go"]);

    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}
