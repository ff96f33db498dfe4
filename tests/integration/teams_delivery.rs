use predicates::prelude::*;
use serde_json::Value;
use test_support::{cmd, JsonServer, NOW};

#[test]
fn debug_mode_prints_the_request_body() {
  let (mut c, _cwd) = cmd();
  c.args(["--sample", "--now-override", NOW, "--tz", "utc", "--no-color", "--teams-debug"]);
  c.assert()
    .success()
    .stdout(predicate::str::contains("Teams publish debug mode: request body"))
    .stdout(predicate::str::contains("\"type\": \"AdaptiveCard\""))
    .stdout(predicate::str::contains("🎉 **Merge Champ Results** 🎉"));
}

#[test]
fn send_teams_without_webhook_fails_before_fetching() {
  let (mut c, _cwd) = cmd();
  c.args(["--sample", "--now-override", NOW, "--tz", "utc", "--send-teams"]);
  c.assert()
    .failure()
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::contains("TEAMS_WEBHOOK_URL"));
}

#[test]
fn summary_is_posted_to_the_webhook() {
  let server = JsonServer::start(vec![("/webhook".into(), 200, "{}".into())]);
  let (mut c, _cwd) = cmd();
  c.env("TEAMS_WEBHOOK_URL", format!("{}/webhook?sig=secret", server.url()))
    .args(["--sample", "--now-override", NOW, "--tz", "utc", "--format", "json", "--send-teams"]);
  c.assert().success();

  let reqs = server.requests();
  assert_eq!(reqs.len(), 1);
  assert_eq!(reqs[0].method, "POST");
  let body: Value = serde_json::from_str(&reqs[0].body).unwrap();
  assert_eq!(body["type"], "message");
  assert_eq!(body["attachments"][0]["contentType"], "application/vnd.microsoft.card.adaptive");
  assert_eq!(body["attachments"][0]["content"]["msteams"]["width"], "Full");
  assert!(body["text"].as_str().unwrap().contains("_Sample data mode_"));
}

#[test]
fn webhook_errors_fail_the_run() {
  let server = JsonServer::start(vec![("/webhook".into(), 500, "{}".into())]);
  let (mut c, _cwd) = cmd();
  c.env("TEAMS_WEBHOOK_URL", format!("{}/webhook?sig=secret", server.url()))
    .args(["--sample", "--now-override", NOW, "--tz", "utc", "--format", "json", "--send-teams"]);
  c.assert()
    .failure()
    .stderr(predicate::str::contains("posting summary to Microsoft Teams"))
    .stderr(predicate::str::contains("secret").not());
}
