//! CLI integration tests for wip
//!
//! These tests drive the binary against a temporary data directory, checking
//! that commands work together and that state survives between invocations.

use chrono::{Datelike, Local, Weekday};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command instance for the wip binary
fn wip_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("wip"))
}

/// Get a command bound to the given data directory
fn wip(home: &Path) -> assert_cmd::Command {
    let mut cmd = wip_cmd();
    cmd.env("WIP_HOME", home);
    cmd
}

/// Create a temporary data directory with the given tasks added
fn setup_with(titles: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for title in titles {
        wip(dir.path()).args(["add", title]).assert().success();
    }
    dir
}

/// Read the status view as JSON
fn status_json(home: &Path) -> serde_json::Value {
    let output = wip(home).args(["status", "--format", "json"]).assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    serde_json::from_str(&stdout).unwrap()
}

/// Find a task's state in the status JSON
fn state_of(home: &Path, id: u64) -> Option<String> {
    let view = status_json(home);
    view["sections"]
        .as_array()?
        .iter()
        .flat_map(|s| s["rows"].as_array().cloned().unwrap_or_default())
        .find(|row| row["id"] == id)
        .and_then(|row| row["state"].as_str().map(str::to_string))
}

// =============================================================================
// Add and Status
// =============================================================================

#[test]
fn test_add_assigns_sequential_ids() {
    let dir = TempDir::new().unwrap();

    wip(dir.path())
        .args(["add", "Write", "the", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added task [1]: Write the docs"));

    wip(dir.path())
        .args(["add", "Review"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added task [2]: Review"));

    assert!(dir.path().join("state.json").is_file());
}

#[test]
fn test_add_rejects_blank_title() {
    let dir = TempDir::new().unwrap();

    wip(dir.path())
        .args(["add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("title cannot be empty"));
}

#[test]
fn test_add_blocked_starts_on_hold() {
    let dir = TempDir::new().unwrap();

    wip(dir.path())
        .args(["add", "Sign", "contract", "--blocked", "Legal"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Added blocked task [1]: Sign contract (blocked by: Legal)",
        ));

    wip(dir.path())
        .args(["add", "Book venue", "-b", "Sam"])
        .assert()
        .success();

    assert_eq!(state_of(dir.path(), 1).as_deref(), Some("on_hold"));
    assert_eq!(state_of(dir.path(), 2).as_deref(), Some("on_hold"));

    wip(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("ON HOLD"))
        .stdout(predicate::str::contains("(Legal)"));

    wip(dir.path()).args(["mark", "1", "release"]).assert().success();
    assert_eq!(state_of(dir.path(), 1).as_deref(), Some("backlog"));
}

#[test]
fn test_add_blocked_rejects_blank_blocker() {
    let dir = TempDir::new().unwrap();

    wip(dir.path())
        .args(["add", "Task", "--blocked", " "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("blocker cannot be empty"));

    assert!(!dir.path().join("state.json").exists());
}

#[test]
fn test_status_on_empty_board() {
    let dir = TempDir::new().unwrap();

    wip(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks yet"));
}

#[test]
fn test_no_subcommand_shows_status() {
    let dir = setup_with(&["Lonely task"]);

    wip(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("BACKLOG"))
        .stdout(predicate::str::contains("[1] Lonely task"));
}

#[test]
fn test_status_groups_tasks() {
    let dir = setup_with(&["Focus", "Parked", "Later"]);
    wip(dir.path()).args(["mark", "1", "active"]).assert().success();
    wip(dir.path())
        .args(["mark", "2", "hold", "--by", "design review"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task [2] on hold (design review)"));

    let output = wip(dir.path()).arg("status").assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).to_string();

    let active = stdout.find("ACTIVE").unwrap();
    let hold = stdout.find("ON HOLD").unwrap();
    let backlog = stdout.find("BACKLOG").unwrap();
    assert!(active < hold && hold < backlog);
    assert!(stdout.contains("(design review)"));
}

#[test]
fn test_invalid_task_id_is_rejected() {
    let dir = setup_with(&["Task"]);

    wip(dir.path())
        .args(["mark", "abc", "active"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid task ID"));

    wip(dir.path())
        .args(["mark", "9", "active"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task not found: 9"));
}

// =============================================================================
// State Machine
// =============================================================================

#[test]
fn test_capacity_guard_and_recovery() {
    let dir = setup_with(&["One", "Two"]);
    wip(dir.path()).args(["config", "max_active", "1"]).assert().success();

    wip(dir.path()).args(["mark", "1", "active"]).assert().success();
    wip(dir.path())
        .args(["mark", "2", "active"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Maximum active tasks (1) reached"));

    wip(dir.path()).args(["mark", "1", "inactive"]).assert().success();
    wip(dir.path()).args(["mark", "2", "active"]).assert().success();
    assert_eq!(state_of(dir.path(), 2).as_deref(), Some("active"));
}

#[test]
fn test_repeated_active_is_a_no_op() {
    let dir = setup_with(&["Task"]);
    wip(dir.path()).args(["mark", "1", "active"]).assert().success();

    wip(dir.path())
        .args(["mark", "1", "active"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already active"));
}

#[test]
fn test_blocked_task_cannot_activate() {
    let dir = setup_with(&["Blocker", "Dependent"]);
    wip(dir.path()).args(["link", "1", "2"]).assert().success();

    wip(dir.path())
        .args(["mark", "2", "active"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("depends on incomplete tasks [1]"));

    // Completing the blocker unblocks without activating
    wip(dir.path()).args(["mark", "1", "done"]).assert().success();
    assert_eq!(state_of(dir.path(), 2).as_deref(), Some("backlog"));
    wip(dir.path()).args(["mark", "2", "active"]).assert().success();
}

#[test]
fn test_hold_cascades_and_release_restores() {
    let dir = setup_with(&["A", "B", "C"]);
    wip(dir.path()).args(["link", "1", "2"]).assert().success();
    wip(dir.path()).args(["link", "2", "3"]).assert().success();

    wip(dir.path())
        .args(["mark", "1", "hold", "--by", "vendor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task [2] on hold (blocked by 1: A)"))
        .stdout(predicate::str::contains("Task [3] on hold (blocked by 1: A)"));

    assert_eq!(state_of(dir.path(), 3).as_deref(), Some("on_hold"));

    wip(dir.path())
        .args(["mark", "1", "release"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Released task [2]: B"))
        .stdout(predicate::str::contains("Released task [3]: C"));

    for id in [1, 2, 3] {
        assert_eq!(state_of(dir.path(), id).as_deref(), Some("backlog"));
    }
}

#[test]
fn test_manual_hold_survives_upstream_release() {
    let dir = setup_with(&["A", "B"]);
    wip(dir.path()).args(["link", "1", "2"]).assert().success();
    wip(dir.path()).args(["mark", "2", "hold", "--by", "own reason"]).assert().success();
    wip(dir.path()).args(["mark", "1", "hold"]).assert().success();
    wip(dir.path()).args(["mark", "1", "release"]).assert().success();

    assert_eq!(state_of(dir.path(), 2).as_deref(), Some("on_hold"));
    wip(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("(own reason)"));
}

#[test]
fn test_release_requires_hold() {
    let dir = setup_with(&["A"]);

    wip(dir.path())
        .args(["mark", "1", "release"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot release task 1 while it is backlog"));
}

#[test]
fn test_by_only_applies_to_hold() {
    let dir = setup_with(&["A"]);

    wip(dir.path())
        .args(["mark", "1", "active", "--by", "someone"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--by only applies to 'hold'"));
}

#[test]
fn test_gone_removes_task_and_edges() {
    let dir = setup_with(&["A", "B"]);
    wip(dir.path()).args(["link", "1", "2"]).assert().success();

    wip(dir.path())
        .args(["mark", "1", "gone"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task [1] gone: A"));

    // Former dependent is free to start, and IDs are not reused
    wip(dir.path()).args(["mark", "2", "active"]).assert().success();
    wip(dir.path())
        .args(["add", "C"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added task [3]: C"));
}

#[test]
fn test_mark_json_output() {
    let dir = setup_with(&["A", "B"]);
    wip(dir.path()).args(["link", "1", "2"]).assert().success();

    let output = wip(dir.path())
        .args(["mark", "1", "hold", "--format", "json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(json["id"], 1);
    assert_eq!(json["state"], "on_hold");
    assert_eq!(json["held"], serde_json::json!([2]));
}

// =============================================================================
// Dependency Graph
// =============================================================================

#[test]
fn test_link_rejects_cycles_self_and_duplicates() {
    let dir = setup_with(&["A", "B", "C"]);
    wip(dir.path()).args(["link", "1", "2"]).assert().success();
    wip(dir.path()).args(["link", "2", "3"]).assert().success();

    wip(dir.path())
        .args(["link", "3", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("would create a cycle"));

    wip(dir.path())
        .args(["link", "2", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("to itself"));

    wip(dir.path())
        .args(["link", "1", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    wip(dir.path())
        .args(["link", "1", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task not found: 7"));
}

#[test]
fn test_unlink_is_idempotent() {
    let dir = setup_with(&["A", "B"]);
    wip(dir.path()).args(["link", "1", "2"]).assert().success();

    wip(dir.path()).args(["unlink", "1", "2"]).assert().success();
    wip(dir.path()).args(["unlink", "1", "2"]).assert().success();
    wip(dir.path()).args(["mark", "2", "active"]).assert().success();
}

#[test]
fn test_link_under_held_blocker_cascades() {
    let dir = setup_with(&["A", "B"]);
    wip(dir.path()).args(["mark", "1", "hold", "--by", "budget"]).assert().success();

    wip(dir.path())
        .args(["link", "1", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task [2] on hold (blocked by 1: A)"));

    wip(dir.path()).args(["unlink", "1", "2"]).assert().success();
    assert_eq!(state_of(dir.path(), 2).as_deref(), Some("backlog"));
}

#[test]
fn test_active_dependents_nest_in_status() {
    let dir = setup_with(&["Parent", "Child"]);
    wip(dir.path()).args(["mark", "1", "active"]).assert().success();
    wip(dir.path()).args(["mark", "2", "active"]).assert().success();
    wip(dir.path()).args(["link", "1", "2"]).assert().success();

    let view = status_json(dir.path());
    let rows = view["sections"][0]["rows"].as_array().unwrap();
    assert_eq!(rows[0]["id"], 1);
    assert_eq!(rows[1]["depth"], 1);
    assert_eq!(rows[1]["dimmed"], true);

    wip(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("└─ [2] Child"));
}

// =============================================================================
// History Views
// =============================================================================

#[test]
fn test_status_done_and_history() {
    let dir = setup_with(&["First", "Second", "Third"]);

    wip(dir.path())
        .args(["status", "--done"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No completed tasks."));

    wip(dir.path()).args(["mark", "1", "done"]).assert().success();
    wip(dir.path()).args(["mark", "3", "done"]).assert().success();

    wip(dir.path())
        .args(["status", "--done"])
        .assert()
        .success()
        .stdout(predicate::str::contains("COMPLETED TASKS"))
        .stdout(predicate::str::contains("First"))
        .stdout(predicate::str::contains("Third"));

    wip(dir.path())
        .args(["history", "-n", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recent History (1 task)"))
        .stdout(predicate::str::contains("[3] Third"))
        .stdout(predicate::str::contains("First").not());
}

#[test]
fn test_weekly_lists_this_weeks_completions() {
    let dir = setup_with(&["Ship it"]);
    wip(dir.path()).args(["mark", "1", "done"]).assert().success();

    let assert = wip(dir.path()).arg("weekly").assert().success();
    match Local::now().weekday() {
        Weekday::Sat | Weekday::Sun => {
            assert.stdout(predicate::str::contains("No tasks completed this week."));
        }
        _ => {
            assert
                .stdout(predicate::str::contains("Week of"))
                .stdout(predicate::str::contains("Ship it"))
                .stdout(predicate::str::contains("Total: 1 task completed"));
        }
    }
}

#[test]
fn test_stale_uses_configured_threshold() {
    let dir = setup_with(&["Fresh"]);

    wip(dir.path())
        .arg("stale")
        .assert()
        .success()
        .stdout(predicate::str::contains("No stale tasks (older than 14 days)."));

    wip(dir.path()).args(["config", "stale_days", "0"]).assert().success();
    wip(dir.path())
        .arg("stale")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stale Tasks (1 older than 0 days)"))
        .stdout(predicate::str::contains("Fresh"));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_set_and_show() {
    let dir = TempDir::new().unwrap();

    wip(dir.path())
        .args(["config", "max_active", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set max_active = 3"));

    wip(dir.path())
        .args(["config", "max_active"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_active = 3"));

    wip(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("stale_days = 14"))
        .stdout(predicate::str::contains("glyphs = emoji"));

    let toml = fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(toml.contains("max_active = 3"));
}

#[test]
fn test_config_rejects_bad_values() {
    let dir = TempDir::new().unwrap();

    wip(dir.path())
        .args(["config", "max_active", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_active must be at least 1"));

    wip(dir.path())
        .args(["config", "stale_days", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-negative integer"));

    wip(dir.path())
        .args(["config", "colour", "red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key 'colour'"));
}

#[test]
fn test_ascii_glyphs() {
    let dir = setup_with(&["Plain"]);
    wip(dir.path()).args(["config", "glyphs", "ascii"]).assert().success();
    wip(dir.path()).args(["mark", "1", "active"]).assert().success();

    wip(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("> [1] Plain"));
}

#[test]
fn test_home_flag_overrides_env() {
    let env_dir = TempDir::new().unwrap();
    let flag_dir = TempDir::new().unwrap();

    wip(env_dir.path())
        .arg("--home")
        .arg(flag_dir.path())
        .args(["add", "Elsewhere"])
        .assert()
        .success();

    assert!(flag_dir.path().join("state.json").is_file());
    assert!(!env_dir.path().join("state.json").exists());
}

// =============================================================================
// Save, Load and Reset
// =============================================================================

#[test]
fn test_save_load_round_trip() {
    let dir = setup_with(&["Plan", "Build"]);
    wip(dir.path()).args(["link", "1", "2"]).assert().success();
    wip(dir.path()).args(["mark", "1", "hold", "--by", "budget"]).assert().success();

    let export = dir.path().join("export.json");
    wip(dir.path())
        .arg("save")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 2 tasks"));

    wip(dir.path()).arg("reset").assert().success();
    assert!(status_json(dir.path())["sections"].as_array().unwrap().is_empty());

    wip(dir.path())
        .arg("load")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup saved to:"))
        .stdout(predicate::str::contains("Loaded 2 tasks"));

    assert_eq!(state_of(dir.path(), 2).as_deref(), Some("on_hold"));
    wip(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("(blocked by 1: Plan)"));

    // Release still cascades after the round trip
    wip(dir.path()).args(["mark", "1", "release"]).assert().success();
    assert_eq!(state_of(dir.path(), 2).as_deref(), Some("backlog"));
}

#[test]
fn test_load_merge_remaps_ids() {
    let source = setup_with(&["Imported A", "Imported B"]);
    wip(source.path()).args(["link", "1", "2"]).assert().success();
    let export = source.path().join("export.json");
    wip(source.path()).arg("save").arg(&export).assert().success();

    let dir = setup_with(&["Local 1", "Local 2"]);
    wip(dir.path())
        .args(["load", "--merge"])
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged 2 tasks"))
        .stdout(predicate::str::contains("Task IDs remapped: 2 IDs reassigned"));

    wip(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("[1] Local 1"))
        .stdout(predicate::str::contains("[3] Imported A"))
        .stdout(predicate::str::contains("[4] Imported B"));

    // The imported edge came along, remapped
    wip(dir.path())
        .args(["mark", "4", "active"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("depends on incomplete tasks [3]"));
}

#[test]
fn test_load_rejects_invalid_file() {
    let dir = setup_with(&["Keep"]);
    let bad = dir.path().join("bad.json");
    fs::write(
        &bad,
        r#"{"next_id": 3, "tasks": [], "edges": [{"blocker": 1, "dependent": 2}]}"#,
    )
    .unwrap();

    wip(dir.path())
        .arg("load")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid state format"));

    wip(dir.path())
        .arg("load")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));

    // Current state untouched
    wip(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("[1] Keep"));
}

#[test]
fn test_reset_backs_up_and_keeps_counter() {
    let dir = setup_with(&["A", "B"]);
    wip(dir.path()).args(["config", "max_active", "4"]).assert().success();

    wip(dir.path())
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup saved to:"))
        .stdout(predicate::str::contains("State reset. All tasks cleared."));

    let backups: Vec<_> = fs::read_dir(dir.path().join("backups"))
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(backups.len(), 1);

    wip(dir.path())
        .args(["add", "C"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added task [3]: C"));

    wip(dir.path())
        .args(["config", "max_active"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_active = 4"));
}

// =============================================================================
// Share and Output Modes
// =============================================================================

#[test]
fn test_share_renders_markdown() {
    let dir = setup_with(&["Focus", "Waiting"]);
    wip(dir.path()).args(["mark", "1", "active"]).assert().success();
    wip(dir.path()).args(["mark", "2", "hold", "--by", "legal"]).assert().success();

    wip(dir.path())
        .arg("share")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# WIP Status"))
        .stdout(predicate::str::contains("## Top of Mind"))
        .stdout(predicate::str::contains("- **[1] Focus**"))
        .stdout(predicate::str::contains("- [2] Waiting _legal_"))
        .stdout(predicate::str::contains("## This Week"));

    let file = dir.path().join("share.md");
    wip(dir.path())
        .args(["share", "--output"])
        .arg(&file)
        .assert()
        .success();
    assert!(fs::read_to_string(&file).unwrap().contains("## On Hold"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let dir = setup_with(&["Task"]);

    wip(dir.path())
        .args(["--verbose", "status"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[verbose] Using data directory"))
        .stderr(predicate::str::contains("[verbose:status]"));
}

#[test]
fn test_json_add_output() {
    let dir = TempDir::new().unwrap();

    let output = wip(dir.path())
        .args(["add", "Structured", "--format", "json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(json["id"], 1);
    assert_eq!(json["title"], "Structured");
    assert_eq!(json["state"], "backlog");
}

#[test]
fn test_released_root_repoints_hold_behind_manual_hold() {
    let dir = setup_with(&["A", "B", "C"]);
    wip(dir.path()).args(["link", "1", "2"]).assert().success();
    wip(dir.path()).args(["link", "2", "3"]).assert().success();
    wip(dir.path()).args(["mark", "1", "hold"]).assert().success();
    wip(dir.path())
        .args(["mark", "2", "hold", "--by", "design"])
        .assert()
        .success();

    wip(dir.path()).args(["mark", "1", "release"]).assert().success();

    let view = status_json(dir.path());
    let c = view["sections"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|s| s["rows"].as_array().cloned().unwrap_or_default())
        .find(|row| row["id"] == 3)
        .unwrap();
    assert_eq!(c["state"], "on_hold");
    assert_eq!(c["hold_reason"], "blocked by 2: B");
}

#[test]
fn test_load_rejects_counter_out_of_range() {
    let dir = setup_with(&["Keep me"]);
    let file = dir.path().join("huge.json");
    fs::write(&file, r#"{"next_id": 18446744073709551615, "tasks": [], "edges": []}"#).unwrap();

    wip(dir.path())
        .args(["load", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));

    assert_eq!(state_of(dir.path(), 1).as_deref(), Some("backlog"));
}
