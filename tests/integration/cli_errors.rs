use predicates::prelude::*;
use test_support::{cmd, NOW};

fn fails_with(env: &[(&str, &str)], args: &[&str], needle: &str) {
  let (mut c, _cwd) = cmd();
  for (k, v) in env {
    c.env(k, v);
  }
  c.args(["--now-override", NOW, "--tz", "utc"]).args(args);
  c.assert().failure().stderr(predicate::str::contains(needle));
}

#[test]
fn invalid_week_is_rejected() {
  fails_with(&[], &["--sample", "--week", "2025-13-01"], "invalid --week '2025-13-01'");
}

#[test]
fn invalid_month_is_rejected() {
  fails_with(&[], &["--sample", "--month", "2025/09"], "invalid --month '2025/09'");
}

#[test]
fn negative_offset_is_rejected() {
  fails_with(&[], &["--sample", "--week-offset", "-1"], "must not be negative");
}

#[test]
fn malformed_environment_values_are_rejected() {
  fails_with(&[("COUNT_MODE", "loud")], &["--sample"], "invalid value 'loud' for COUNT_MODE");
  fails_with(&[("MR_WEIGHT_RULES", "20-0.5")], &["--sample"], "invalid weight rule");
  fails_with(&[("MR_WEIGHT_RULES", "20:0.9,80:0.5")], &["--sample"], "must not decrease");
}

#[test]
fn incompatible_activity_policy_is_rejected() {
  fails_with(&[], &["--sample", "--state", "all", "--timestamp", "merged"], "merged timestamp basis");
}

#[test]
fn missing_source_and_roster_are_reported() {
  fails_with(&[("TEAM_MEMBERS", "alice")], &[], "no record source configured");
  fails_with(&[], &["--source", "gitlab"], "team roster is empty");
  fails_with(&[("TEAM_MEMBERS", "alice"), ("GITLAB_TOKEN", "t")], &["--source", "gitlab"], "GROUP_ID or PROJECT_ID");
}

#[test]
fn unknown_time_zone_is_rejected() {
  let (mut c, _cwd) = cmd();
  c.args(["--sample", "--tz", "Mars/Olympus"]);
  c.assert().failure().stderr(predicate::str::contains("invalid time zone 'Mars/Olympus'"));
}
