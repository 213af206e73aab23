#![allow(deprecated)]

mod common;

use common::{gp_command, gp_json, setup_test_env};
use predicates::prelude::*;
use std::path::Path;

/// Create a two-week python goal with its generated plan; returns the goal id.
fn create_python_goal(dir: &Path) -> String {
    let created = gp_json(
        dir,
        &["goal", "create", "Learn Python", "--weeks", "2", "--generate"],
    );
    assert_eq!(created["tasks_generated"], 6);
    created["goal"]["id"].as_str().unwrap().to_string()
}

/// Task ids of the goal in display order.
fn task_ids(dir: &Path) -> Vec<String> {
    let weeks = gp_json(dir, &["task", "list"]);
    weeks
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|w| w["tasks"].as_array().unwrap().clone())
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_goal_create_and_list() {
    let temp_dir = setup_test_env();

    gp_command(temp_dir.path())
        .args(["goal", "create", "Bake sourdough", "--weeks", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Goal created"))
        .stdout(predicate::str::contains("Bake sourdough"));

    gp_command(temp_dir.path())
        .args(["goal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bake sourdough"))
        .stdout(predicate::str::contains("3 week(s)"));
}

#[test]
fn test_goal_create_rejects_bad_duration() {
    let temp_dir = setup_test_env();

    gp_command(temp_dir.path())
        .args(["goal", "create", "Too long", "--weeks", "53"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("VALIDATION_ERROR"))
        .stderr(predicate::str::contains("duration_weeks"));
}

#[test]
fn test_generated_plan_locks_in_sequence() {
    let temp_dir = setup_test_env();
    create_python_goal(temp_dir.path());

    let weeks = gp_json(temp_dir.path(), &["task", "list"]);
    let week1 = weeks[0]["tasks"].as_array().unwrap();
    assert_eq!(weeks.as_array().unwrap().len(), 2);
    assert_eq!(week1.len(), 3);
    assert_eq!(week1[0]["title"], "Syntax & Variables");
    assert_eq!(week1[0]["is_locked"], false);
    assert_eq!(week1[1]["is_locked"], true);
    assert_eq!(weeks[1]["tasks"][0]["title"], "Functions");
}

#[test]
fn test_done_unlocks_next_task() {
    let temp_dir = setup_test_env();
    create_python_goal(temp_dir.path());
    let ids = task_ids(temp_dir.path());

    // Abbreviated id
    gp_command(temp_dir.path())
        .args(["task", "done", &ids[0][..8]])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed"))
        .stdout(predicate::str::contains("Unlocked:"))
        .stdout(predicate::str::contains("Data Types"));

    let weeks = gp_json(temp_dir.path(), &["task", "list", "--week", "1"]);
    assert_eq!(weeks[0]["tasks"][0]["status"], "completed");
    assert_eq!(weeks[0]["tasks"][1]["is_locked"], false);
    assert_eq!(weeks[0]["tasks"][2]["is_locked"], true);
}

#[test]
fn test_completing_locked_task_is_rejected() {
    let temp_dir = setup_test_env();
    create_python_goal(temp_dir.path());
    let ids = task_ids(temp_dir.path());

    gp_command(temp_dir.path())
        .args(["task", "done", &ids[2]])
        .assert()
        .failure()
        .stderr(predicate::str::contains("VALIDATION_ERROR"))
        .stderr(predicate::str::contains("\"field\": \"status\""));
}

#[test]
fn test_rm_requires_force_for_dependended_task() {
    let temp_dir = setup_test_env();
    create_python_goal(temp_dir.path());
    let ids = task_ids(temp_dir.path());

    gp_command(temp_dir.path())
        .args(["task", "rm", &ids[0]])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DEPENDENCY_CONFLICT"));

    let outcome = gp_json(temp_dir.path(), &["task", "rm", &ids[0], "--force"]);
    assert_eq!(outcome["outcome"], "deleted");
    assert_eq!(outcome["orphaned"][0], ids[1].as_str());

    // The orphaned dependent stays locked on the missing id
    let weeks = gp_json(temp_dir.path(), &["task", "list", "--week", "1"]);
    assert_eq!(weeks[0]["tasks"].as_array().unwrap().len(), 2);
    assert_eq!(weeks[0]["tasks"][0]["id"], ids[1].as_str());
    assert_eq!(weeks[0]["tasks"][0]["is_locked"], true);
}

#[test]
fn test_move_stops_at_week_edge_unless_across_weeks() {
    let temp_dir = setup_test_env();
    create_python_goal(temp_dir.path());
    let ids = task_ids(temp_dir.path());

    let boundary = gp_json(temp_dir.path(), &["task", "move", &ids[0], "up"]);
    assert_eq!(boundary["outcome"], "boundary");

    // First task of week 2 stays in its week by default
    let stopped = gp_json(temp_dir.path(), &["task", "move", &ids[3], "up"]);
    assert_eq!(stopped["outcome"], "boundary");
    let stopped = gp_json(temp_dir.path(), &["task", "move", &ids[2], "down"]);
    assert_eq!(stopped["outcome"], "boundary");

    // Last task of week 1 swaps places with the first task of week 2
    let moved = gp_json(
        temp_dir.path(),
        &["task", "move", &ids[2], "down", "--across-weeks"],
    );
    assert_eq!(moved["outcome"], "applied");

    let weeks = gp_json(temp_dir.path(), &["task", "list"]);
    assert_eq!(weeks[0]["tasks"][2]["id"], ids[3].as_str());
    assert_eq!(weeks[1]["tasks"][0]["id"], ids[2].as_str());

    // Middle of a week moves without the flag
    let moved = gp_json(temp_dir.path(), &["task", "move", &ids[1], "up"]);
    assert_eq!(moved["outcome"], "applied");
    let weeks = gp_json(temp_dir.path(), &["task", "list", "--week", "1"]);
    assert_eq!(weeks[0]["tasks"][0]["id"], ids[1].as_str());
}

#[test]
fn test_add_task_with_dependency_and_cycle_rejection() {
    let temp_dir = setup_test_env();
    gp_command(temp_dir.path())
        .args(["goal", "create", "Garden", "--weeks", "2"])
        .assert()
        .success();

    let first = gp_json(temp_dir.path(), &["task", "add", "Dig beds", "--week", "1"]);
    let first_id = first["task"]["id"].as_str().unwrap().to_string();
    assert_eq!(first["is_locked"], false);

    let second = gp_json(
        temp_dir.path(),
        &["task", "add", "Plant seeds", "--week", "2", "--depends-on", &first_id[..8]],
    );
    let second_id = second["task"]["id"].as_str().unwrap().to_string();
    assert_eq!(second["is_locked"], true);
    assert_eq!(second["task"]["dependencies"][0], first_id.as_str());

    gp_command(temp_dir.path())
        .args(["task", "update", &first_id, "--depends-on", &second_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cycle"));

    let cycles = gp_json(temp_dir.path(), &["task", "cycles"]);
    assert_eq!(cycles["cycles"].as_array().unwrap().len(), 0);
}

#[test]
fn test_log_and_progress() {
    let temp_dir = setup_test_env();
    create_python_goal(temp_dir.path());

    gp_command(temp_dir.path())
        .args(["log", "add", "--tasks", "2", "--hours", "1.5", "--time-of-day", "evening"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged"));

    let logs = gp_json(temp_dir.path(), &["log", "list"]);
    assert_eq!(logs.as_array().unwrap().len(), 1);
    assert_eq!(logs[0]["time_of_day"], "Evening");

    let report = gp_json(temp_dir.path(), &["progress"]);
    assert_eq!(report["goal"]["tasks_total"], 6);
    assert_eq!(report["burndown"].as_array().unwrap().len(), 1);
    assert_eq!(report["burndown"][0]["actual_remaining"], 4);
    assert_eq!(report["productivity"]["peak"], "Evening");
    assert_eq!(report["productivity"]["peak_percentage"], 100);
}

#[test]
fn test_log_rejects_negative_values() {
    let temp_dir = setup_test_env();
    create_python_goal(temp_dir.path());

    gp_command(temp_dir.path())
        .args(["log", "add", "--tasks", "-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tasks_completed"));
}

#[test]
fn test_log_rejects_more_hours_than_a_day() {
    let temp_dir = setup_test_env();
    create_python_goal(temp_dir.path());

    gp_command(temp_dir.path())
        .args(["log", "add", "--tasks", "1", "--hours", "1e20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hours_focused"));

    // Nothing was stored, so progress still renders
    let logs = gp_json(temp_dir.path(), &["log", "list"]);
    assert!(logs.as_array().unwrap().is_empty());
    gp_command(temp_dir.path()).args(["progress"]).assert().success();
}

#[test]
fn test_goal_flag_required_with_several_goals() {
    let temp_dir = setup_test_env();
    let first = create_python_goal(temp_dir.path());
    gp_command(temp_dir.path())
        .args(["goal", "create", "Learn React", "--weeks", "1"])
        .assert()
        .success();

    gp_command(temp_dir.path())
        .args(["task", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--goal"));

    gp_command(temp_dir.path())
        .args(["task", "list", "--goal", &first[..8]])
        .assert()
        .success()
        .stdout(predicate::str::contains("Syntax & Variables"));
}

#[test]
fn test_read_command_outside_project_fails() {
    let temp_dir = setup_test_env();

    gp_command(temp_dir.path())
        .args(["task", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NOT_A_PROJECT"));
}

#[test]
fn test_goal_delete_removes_everything() {
    let temp_dir = setup_test_env();
    let goal_id = create_python_goal(temp_dir.path());

    gp_command(temp_dir.path())
        .args(["goal", "delete", &goal_id])
        .assert()
        .success();

    gp_command(temp_dir.path())
        .args(["goal", "show", &goal_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GOAL_NOT_FOUND"));
}
