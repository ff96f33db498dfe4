use serde_json::Value;
use test_support::{cmd, read_fixture_text, JsonServer, NOW};

const PULLS: &str = "/repos/acme/widgets/pulls";

fn run(extra_env: &[(&str, &str)]) -> (Value, JsonServer) {
  let server = JsonServer::start(vec![
    (PULLS.into(), 200, read_fixture_text("github/pulls.json")),
    (format!("{PULLS}/12"), 200, read_fixture_text("github/pull_12.json")),
    (format!("{PULLS}/11"), 200, read_fixture_text("github/pull_11.json")),
  ]);

  let (mut c, _cwd) = cmd();
  c.env("GITHUB_API_URL", server.url())
    .env("GITHUB_REPOSITORY", "https://github.com/acme/widgets.git")
    .env("GITHUB_TOKEN", "ghp-test")
    .env("TEAM_MEMBERS", "alice,bob");
  for (k, v) in extra_env {
    c.env(k, v);
  }
  c.args(["--now-override", NOW, "--tz", "utc", "--format", "json"]);

  let out = c.output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  (serde_json::from_slice(&out.stdout).unwrap(), server)
}

#[test]
fn merged_pull_requests_count_and_closed_ones_are_filtered() {
  let (v, server) = run(&[]);

  let ranks: Vec<(String, u64)> = v["week"]["rows"]
    .as_array()
    .unwrap()
    .iter()
    .map(|r| (r["stat"]["member"].as_str().unwrap().to_string(), r["rank"].as_u64().unwrap()))
    .collect();
  assert_eq!(ranks, vec![("alice".to_string(), 1), ("bob".to_string(), 1)]);
  assert_eq!(v["filtered_by_state"], 1);
  assert_eq!(v["month"]["summary"]["total_count"], 2);

  let reqs = server.requests();
  assert_eq!(reqs.len(), 1);
  assert_eq!(reqs[0].header("authorization"), Some("Bearer ghp-test"));
  assert!(reqs[0].target.contains("state=closed"));
  assert!(reqs[0].target.contains("sort=created"));
  assert!(reqs[0].target.contains("direction=desc"));
}

#[test]
fn weighted_mode_reads_pull_request_details() {
  let (v, server) = run(&[("COUNT_MODE", "weighted"), ("MR_WEIGHT_RULES", "20:0.5,100:1.0")]);

  assert_eq!(v["week"]["rows"][0]["stat"]["member"], "bob");
  assert_eq!(v["week"]["rows"][0]["stat"]["weighted_score"], 1.0);
  assert_eq!(v["week"]["rows"][1]["stat"]["weighted_score"], 0.5);
  assert_eq!(v["week"]["rows"][1]["rank"], 2);

  let paths: Vec<String> = server.requests().iter().map(|r| r.path().to_string()).collect();
  assert!(paths.contains(&format!("{PULLS}/12")));
  assert!(paths.contains(&format!("{PULLS}/11")));
}
