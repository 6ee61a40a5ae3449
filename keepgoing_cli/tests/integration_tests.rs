//! Integration tests for the keepgoing binary.
//!
//! These tests verify end-to-end behavior including:
//! - Onboarding and routine editing
//! - Daily check-off and streaks across days
//! - Milestone prompts and their bookkeeping
//! - Data persistence between runs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("keepgoing"))
}

/// CLI invocation bound to a data directory
fn cli_in(data_dir: &Path) -> Command {
    let mut cmd = cli();
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

fn onboard(data_dir: &Path, exercises: &[&str]) {
    let mut cmd = cli_in(data_dir);
    cmd.arg("onboard");
    for exercise in exercises {
        cmd.arg("--exercise").arg(exercise);
    }
    cmd.assert().success();
}

fn done(data_dir: &Path, exercise: &str, date: &str) -> assert_cmd::assert::Assert {
    cli_in(data_dir)
        .arg("--date")
        .arg(date)
        .arg("done")
        .arg(exercise)
        .write_stdin("")
        .assert()
        .success()
}

fn read_data(data_dir: &Path) -> serde_json::Value {
    let contents =
        fs::read_to_string(data_dir.join("keepgoing.json")).expect("Failed to read data file");
    serde_json::from_str(&contents).expect("Data file is not valid JSON")
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Daily exercise routine and streak tracker",
        ));
}

#[test]
fn test_today_requires_onboarding() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .arg("today")
        .assert()
        .failure()
        .stderr(predicate::str::contains("keepgoing onboard"));
}

#[test]
fn test_onboard_creates_data_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli_in(data_dir)
        .arg("onboard")
        .arg("--exercise")
        .arg("Push-ups=15")
        .arg("--exercise")
        .arg("Plank=30s@yoga")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 exercises"));

    let data = read_data(data_dir);
    assert_eq!(data["onboarded"], true);
    assert_eq!(data["exercises"][0]["name"], "Push-ups");
    assert_eq!(data["exercises"][0]["target"]["type"], "count");
    assert_eq!(data["exercises"][0]["target"]["value"], 15);
    assert_eq!(data["exercises"][1]["target"]["type"], "label");
    assert_eq!(data["exercises"][1]["kind"], "yoga");
}

#[test]
fn test_onboard_twice_refused() {
    let temp_dir = setup_test_dir();
    onboard(temp_dir.path(), &["Push-ups=15"]);

    cli_in(temp_dir.path())
        .arg("onboard")
        .arg("--exercise")
        .arg("Squats=20")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already set up"));
}

#[test]
fn test_onboard_rejects_malformed_exercise() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .arg("onboard")
        .arg("--exercise")
        .arg("Push-ups")
        .assert()
        .failure();

    assert!(!temp_dir.path().join("keepgoing.json").exists());
}

#[test]
fn test_today_shows_routine() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    onboard(data_dir, &["Push-ups=15", "Plank=30s@yoga"]);

    cli_in(data_dir)
        .arg("--date")
        .arg("2024-01-03")
        .assert()
        .success()
        .stdout(predicate::str::contains("Push-ups"))
        .stdout(predicate::str::contains("Plank (yoga)"))
        .stdout(predicate::str::contains("0 of 2 completed"));
}

#[test]
fn test_done_toggles_and_counts_streak() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    onboard(data_dir, &["Push-ups=15", "Squats=20"]);

    done(data_dir, "Push-ups", "2024-01-01");
    done(data_dir, "1", "2024-01-02");
    done(data_dir, "push-ups", "2024-01-03")
        .stdout(predicate::str::contains("3 day streak"));

    cli_in(data_dir)
        .arg("--date")
        .arg("2024-01-04")
        .arg("streak")
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall: 0 day streak"));

    // Toggle off again
    done(data_dir, "Push-ups", "2024-01-03").stdout(predicate::str::contains("not done"));
}

#[test]
fn test_done_unknown_exercise_fails() {
    let temp_dir = setup_test_dir();
    onboard(temp_dir.path(), &["Push-ups=15"]);

    cli_in(temp_dir.path())
        .arg("done")
        .arg("Burpees")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown exercise"));
}

#[test]
fn test_celebration_when_routine_complete() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    onboard(data_dir, &["Push-ups=15", "Squats=20"]);

    done(data_dir, "Push-ups", "2024-02-01");
    done(data_dir, "Squats", "2024-02-01")
        .stdout(predicate::str::contains("All done!"))
        .stdout(predicate::str::contains("1 day streak!"));
}

#[test]
fn test_milestone_prompt_accept_raises_target() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    onboard(data_dir, &["Push-ups=15"]);

    for day in 1..=9 {
        done(data_dir, "Push-ups", &format!("2024-01-{:02}", day))
            .stdout(predicate::str::contains("Nice work").not());
    }

    cli_in(data_dir)
        .arg("--date")
        .arg("2024-01-10")
        .arg("done")
        .arg("Push-ups")
        .arg("--accept")
        .assert()
        .success()
        .stdout(predicate::str::contains("10-day streak on Push-ups"))
        .stdout(predicate::str::contains("from 15 to 17"))
        .stdout(predicate::str::contains("target is now 17"));

    let data = read_data(data_dir);
    assert_eq!(data["exercises"][0]["target"]["value"], 17);
    let id = data["exercises"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(data["progress"]["last_streak_prompt"][&id], 10);

    // Same milestone is not offered again after re-toggling
    done(data_dir, "Push-ups", "2024-01-10");
    done(data_dir, "Push-ups", "2024-01-10").stdout(predicate::str::contains("Nice work").not());
}

#[test]
fn test_milestone_prompt_interactive_skip() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    onboard(data_dir, &["Push-ups=15"]);

    for day in 1..=9 {
        done(data_dir, "Push-ups", &format!("2024-03-{:02}", day));
    }

    cli_in(data_dir)
        .arg("--date")
        .arg("2024-03-10")
        .arg("done")
        .arg("Push-ups")
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Want to bump up your reps"))
        .stdout(predicate::str::contains("next milestone"));

    let data = read_data(data_dir);
    assert_eq!(data["exercises"][0]["target"]["value"], 15);
    let id = data["exercises"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(data["progress"]["last_streak_prompt"][&id], 10);
}

#[test]
fn test_label_target_only_acknowledged() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    onboard(data_dir, &["Plank=30s@yoga"]);

    for day in 1..=9 {
        done(data_dir, "Plank", &format!("2024-05-{:02}", day));
    }

    cli_in(data_dir)
        .arg("--date")
        .arg("2024-05-10")
        .arg("done")
        .arg("Plank")
        .arg("--accept")
        .assert()
        .success()
        .stdout(predicate::str::contains("Keep pushing"))
        .stdout(predicate::str::contains("bump up").not());

    let data = read_data(data_dir);
    assert_eq!(data["exercises"][0]["target"]["text"], "30s");
    let id = data["exercises"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(data["progress"]["last_streak_prompt"][&id], 10);
}

#[test]
fn test_custom_milestone_interval() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[progression]\nmilestone_interval = 3\ntarget_increment = 5\n",
    )
    .unwrap();

    onboard(&data_dir, &["Push-ups=15"]);
    for day in 1..=2 {
        done(&data_dir, "Push-ups", &format!("2024-07-{:02}", day));
    }

    cli_in(&data_dir)
        .arg("--config")
        .arg(&config_path)
        .arg("--date")
        .arg("2024-07-03")
        .arg("done")
        .arg("Push-ups")
        .arg("--accept")
        .assert()
        .success()
        .stdout(predicate::str::contains("from 15 to 20"));
}

#[test]
fn test_add_edit_move_remove() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    onboard(data_dir, &["Push-ups=15"]);

    cli_in(data_dir)
        .args(["add", "Sun salutation", "5", "--yoga"])
        .assert()
        .success()
        .stdout(predicate::str::contains("position 2"));

    cli_in(data_dir)
        .args(["edit", "2", "--target", "10", "--label"])
        .assert()
        .success();

    cli_in(data_dir)
        .args(["move", "Sun salutation", "1"])
        .assert()
        .success();

    let data = read_data(data_dir);
    assert_eq!(data["exercises"][0]["name"], "Sun salutation");
    assert_eq!(data["exercises"][0]["order"], 0);
    assert_eq!(data["exercises"][0]["target"]["type"], "label");
    assert_eq!(data["exercises"][0]["target"]["text"], "10");
    assert_eq!(data["exercises"][1]["name"], "Push-ups");

    cli_in(data_dir)
        .args(["remove", "Push-ups"])
        .assert()
        .success();

    cli_in(data_dir)
        .args(["remove", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one exercise"));

    let data = read_data(data_dir);
    assert_eq!(data["exercises"].as_array().unwrap().len(), 1);
}

#[test]
fn test_edit_switches_exercise_type() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    onboard(data_dir, &["Push-ups=15"]);

    cli_in(data_dir)
        .args(["edit", "Push-ups", "--yoga"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(yoga)"));
    assert_eq!(read_data(data_dir)["exercises"][0]["kind"], "yoga");

    cli_in(data_dir)
        .args(["edit", "1", "--weights"])
        .assert()
        .success();
    assert_eq!(read_data(data_dir)["exercises"][0]["kind"], "weights");

    cli_in(data_dir)
        .args(["edit", "1", "--yoga", "--weights"])
        .assert()
        .failure();
}

#[test]
fn test_adding_exercise_breaks_overall_streak() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    onboard(data_dir, &["Push-ups=15"]);

    done(data_dir, "Push-ups", "2024-02-01");
    done(data_dir, "Push-ups", "2024-02-02");

    cli_in(data_dir)
        .args(["--date", "2024-02-02", "streak"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall: 2 day streak"));

    cli_in(data_dir)
        .args(["add", "Squats", "20"])
        .assert()
        .success();
    done(data_dir, "Squats", "2024-02-02");

    cli_in(data_dir)
        .args(["--date", "2024-02-02", "streak"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall: 1 day streak"));
}

#[test]
fn test_invalid_date_rejected() {
    let temp_dir = setup_test_dir();
    onboard(temp_dir.path(), &["Push-ups=15"]);

    cli_in(temp_dir.path())
        .args(["--date", "2024-2-30", "today"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}
