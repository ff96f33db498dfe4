use predicates::prelude::*;
use serde_json::Value;
use test_support::{cmd, NOW};

fn sample_json(extra: &[&str]) -> Value {
  let (mut c, _cwd) = cmd();
  c.args(["--sample", "--now-override", NOW, "--tz", "utc", "--format", "json"]).args(extra);
  let out = c.output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn sample_json_report_covers_week_and_month() {
  let v = sample_json(&[]);

  assert_eq!(v["sample"], true);
  assert_eq!(v["generated_at"], "2025-09-03T12:00:00Z");
  assert_eq!(v["week"]["label"], "Sep 01 - Sep 07, 2025");
  assert_eq!(v["month"]["label"], "September 2025");
  assert_eq!(v["week"]["rows"].as_array().map(Vec::len), Some(4));
  assert_eq!(v["month"]["summary"]["roster_size"], 4);
  assert_eq!(v["count_mode"], "raw");
}

#[test]
fn sample_runs_are_reproducible() {
  assert_eq!(sample_json(&[]), sample_json(&[]));
}

#[test]
fn explicit_week_and_month_selectors() {
  let v = sample_json(&["--week", "2025-08-20", "--month", "2025-08"]);
  assert_eq!(v["week"]["label"], "Aug 18 - Aug 24, 2025");
  assert_eq!(v["month"]["label"], "August 2025");

  let v = sample_json(&["--week-offset", "1", "--month-offset", "1"]);
  assert_eq!(v["week"]["label"], "Aug 25 - Aug 31, 2025");
  assert_eq!(v["month"]["label"], "August 2025");
}

#[test]
fn roster_comes_from_environment() {
  let (mut c, _cwd) = cmd();
  c.env("TEAM_MEMBERS", "zed.alpha, amy")
    .args(["--sample", "--now-override", NOW, "--tz", "utc", "--format", "json"]);
  let out = c.output().unwrap();
  assert!(out.status.success());

  let v: Value = serde_json::from_slice(&out.stdout).unwrap();
  let members: Vec<&str> = v["month"]["rows"].as_array().unwrap().iter().filter_map(|r| r["stat"]["member"].as_str()).collect();
  assert_eq!(members.len(), 2);
  assert!(members.contains(&"amy") && members.contains(&"zed.alpha"));
}

#[test]
fn env_file_in_working_directory_is_loaded() {
  let (mut c, cwd) = cmd();
  std::fs::write(cwd.path().join(".env"), "TEAM_MEMBERS=solo.dev\nCOUNT_MODE=weighted\n").unwrap();
  c.args(["--sample", "--now-override", NOW, "--tz", "utc", "--format", "json"]);
  let out = c.output().unwrap();
  assert!(out.status.success());

  let v: Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["count_mode"], "weighted");
  assert_eq!(v["month"]["rows"][0]["stat"]["member"], "solo.dev");
}

#[test]
fn text_output_combined_and_monthly_only() {
  let (mut c, _cwd) = cmd();
  c.args(["--sample", "--now-override", NOW, "--tz", "utc", "--no-color"]);
  c.assert()
    .success()
    .stdout(predicate::str::contains("MERGE CHAMP RESULTS"))
    .stdout(predicate::str::contains("Using sample data for demonstration"))
    .stdout(predicate::str::contains("Sep 01 - Sep 07, 2025"))
    .stdout(predicate::str::contains("John Doe"))
    .stdout(predicate::str::contains("│"))
    .stdout(predicate::str::contains("\u{1b}[").not());

  let (mut c, _cwd) = cmd();
  c.args(["--sample", "--now-override", NOW, "--tz", "utc", "--no-color", "--view", "monthly-only"]);
  c.assert()
    .success()
    .stdout(predicate::str::contains("September 2025"))
    .stdout(predicate::str::contains("Sep 01 - Sep 07").not())
    .stdout(predicate::str::contains("TEAM BREAKDOWN"));
}

#[test]
fn diagnostics_go_to_stderr() {
  let (mut c, _cwd) = cmd();
  c.env("RUST_LOG", "info").args(["--sample", "--now-override", NOW, "--tz", "utc", "--format", "json"]);
  let out = c.output().unwrap();
  assert!(out.status.success());

  let _: Value = serde_json::from_slice(&out.stdout).unwrap();
  assert!(String::from_utf8_lossy(&out.stderr).contains("report ready"));
}
