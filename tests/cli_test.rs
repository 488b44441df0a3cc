/// CLI binary integration tests using assert_cmd
///
/// These tests invoke the actual binary against a temporary storage root and
/// verify command-line behavior
mod common;

use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use common::{ID_A, ID_B, RecordBuilder, StoreBuilder, TranscriptBuilder, example_store};
use predicates::prelude::*;

fn bushwack(storage_root: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_claude-bushwack"));
    cmd.arg("--storage-root").arg(storage_root).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_stats_command_with_data() {
    let store = example_store();

    bushwack(store.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversation Store Statistics"))
        .stdout(predicate::str::contains("Conversations: 2"))
        .stdout(predicate::str::contains("Branches: 1"))
        .stdout(predicate::str::contains("Trees: 1"))
        .stdout(predicate::str::contains("Projects: 1"))
        .stdout(predicate::str::contains("Transcript records: 4"));
}

#[test]
fn test_cli_stats_command_missing_storage_root() {
    let temp = tempfile::TempDir::new().unwrap();

    bushwack(&temp.path().join("projects"))
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversations: 0"));
}

#[test]
fn test_cli_storage_root_from_env() {
    let store = example_store();

    Command::new(env!("CARGO_BIN_EXE_claude-bushwack"))
        .env("CLAUDE_PROJECTS_DIR", store.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversations: 2"));
}

#[test]
fn test_cli_no_command_shows_help_message() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_claude-bushwack"));
    cmd.assert().success().stdout(predicate::str::contains("Use --help for usage information"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_claude-bushwack"));
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Browse and branch Claude Code conversations"))
        .stdout(predicate::str::contains("branch"))
        .stdout(predicate::str::contains("tree"));
}

#[test]
fn test_cli_list_all_projects() {
    let store = example_store();

    bushwack(store.path())
        .args(["list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aaaaaaaa"))
        .stdout(predicate::str::contains("bbbbbbbb"))
        .stdout(predicate::str::contains("Try another approach"))
        .stdout(predicate::str::contains("/home/u/proj"));
}

#[test]
fn test_cli_list_other_project_is_empty() {
    let store = example_store();

    bushwack(store.path())
        .args(["list", "--project", "/home/u/unrelated"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No conversations found"));
}

#[test]
fn test_cli_list_rejects_all_with_project() {
    let store = example_store();

    bushwack(store.path()).args(["list", "--all", "--project", "/home/u/proj"]).assert().failure();
}

#[test]
fn test_cli_tree_shows_children() {
    let store = example_store();

    bushwack(store.path())
        .args(["tree", "--project", "/home/u/proj"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aaaaaaaa"))
        .stdout(predicate::str::contains("└─ bbbbbbbb"));
}

#[test]
fn test_cli_tree_marks_missing_parent() {
    let store = StoreBuilder::new()
        .with_project(
            "/home/u/proj",
            &[TranscriptBuilder::new(ID_B).with_record(RecordBuilder::user("orphan").parent(ID_A))],
        )
        .build();

    bushwack(store.path())
        .args(["tree", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(parent not found)"));
}

#[test]
fn test_cli_branch_into_project() {
    let store = example_store();

    bushwack(store.path())
        .args(["branch", "aaaa", "--project", "/home/u/proj2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created branch"))
        .stdout(predicate::str::contains(format!("Parent:  {ID_A}")))
        .stdout(predicate::str::contains("/home/u/proj2"));

    assert!(store.path().join("-home-u-proj2").is_dir());

    bushwack(store.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversations: 3"))
        .stdout(predicate::str::contains("Projects: 2"));
}

#[test]
fn test_cli_copy_has_no_parent() {
    let store = example_store();

    bushwack(store.path())
        .args(["copy", ID_B, "--project", "/home/u/proj2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created copy"))
        .stdout(predicate::str::contains("Parent:").not());
}

#[test]
fn test_cli_ancestry() {
    let store = example_store();

    bushwack(store.path())
        .args(["ancestry", "bbbbbbbb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aaaaaaaa"))
        .stdout(predicate::str::contains("  bbbbbbbb"));
}

#[test]
fn test_cli_branch_unknown_id_fails() {
    let store = example_store();

    bushwack(store.path())
        .args(["branch", "ffffffff"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no conversation found with ID: ffffffff"));
}

#[test]
fn test_cli_branch_ambiguous_prefix_fails() {
    let store = StoreBuilder::new()
        .with_project(
            "/home/u/proj",
            &[
                TranscriptBuilder::new("abcd0000-0000-4000-8000-000000000001").with_record(RecordBuilder::user("1")),
                TranscriptBuilder::new("abcd0000-0000-4000-8000-000000000002").with_record(RecordBuilder::user("2")),
            ],
        )
        .build();

    bushwack(store.path())
        .args(["branch", "abcd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ambiguous conversation ID 'abcd': 2 matches"));
}
