use serde_json::Value;
use test_support::{cmd, read_fixture_text, JsonServer, NOW};

const LIST: &str = "/api/v4/projects/42/merge_requests";

fn server() -> JsonServer {
  JsonServer::start(vec![
    (LIST.into(), 200, read_fixture_text("gitlab/merge_requests.json")),
    (format!("{LIST}/2"), 200, read_fixture_text("gitlab/merge_request_2.json")),
  ])
}

fn run(server: &JsonServer, extra_env: &[(&str, &str)]) -> Value {
  let (mut c, _cwd) = cmd();
  c.env("GITLAB_URL", server.url())
    .env("GITLAB_TOKEN", "glpat-test")
    .env("PROJECT_ID", "42")
    .env("TEAM_MEMBERS", "alice,bob");
  for (k, v) in extra_env {
    c.env(k, v);
  }
  c.args(["--now-override", NOW, "--tz", "utc", "--format", "json"]);

  let out = c.output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

fn metric(v: &Value, window: &str, member: &str, field: &str) -> Value {
  v[window]["rows"]
    .as_array()
    .unwrap()
    .iter()
    .find(|r| r["stat"]["member"] == member)
    .map(|r| r["stat"][field].clone())
    .unwrap()
}

#[test]
fn raw_counts_from_a_project() {
  let server = server();
  let v = run(&server, &[]);

  assert_eq!(v["sample"], false);
  assert_eq!(metric(&v, "week", "alice", "raw_count"), 2);
  assert_eq!(metric(&v, "week", "bob", "raw_count"), 0);
  assert_eq!(metric(&v, "month", "bob", "raw_count"), 1);
  assert_eq!(v["month"]["summary"]["other_activity"], 1);
  assert_eq!(v["skipped_records"], 1);
  assert!(v["warnings"][0].as_str().unwrap().contains("!5"));

  let reqs = server.requests();
  assert_eq!(reqs.len(), 1, "raw mode needs no size lookups");
  let list = &reqs[0];
  assert_eq!(list.path(), LIST);
  assert_eq!(list.header("private-token"), Some("glpat-test"));
  assert!(list.target.contains("state=merged"));
  assert!(list.target.contains("per_page=100"));
  assert!(list.target.contains("page=1"));
  assert!(list.target.contains("created_after="));
}

#[test]
fn weighted_counts_resolve_missing_sizes() {
  let server = server();
  let v = run(&server, &[("COUNT_MODE", "weighted"), ("MR_WEIGHT_RULES", "20:0.5,100:1.0")]);

  assert_eq!(v["count_mode"], "weighted");
  assert_eq!(metric(&v, "week", "alice", "weighted_score"), 1.5);
  assert_eq!(metric(&v, "month", "bob", "weighted_score"), 0.5);
  assert_eq!(v["month"]["rows"][0]["stat"]["member"], "alice");

  let paths: Vec<String> = server.requests().iter().map(|r| r.path().to_string()).collect();
  assert!(paths.contains(&format!("{LIST}/2")));
  // !5 has no route; the failed lookup only degrades its size.
  assert!(paths.contains(&format!("{LIST}/5")));
  assert!(!paths.contains(&format!("{LIST}/1")));
}

#[test]
fn list_failures_end_the_run() {
  let server = JsonServer::start(vec![(LIST.into(), 500, r#"{"message":"boom"}"#.into())]);
  let (mut c, _cwd) = cmd();
  c.env("GITLAB_URL", server.url())
    .env("GITLAB_TOKEN", "glpat-test")
    .env("PROJECT_ID", "42")
    .env("TEAM_MEMBERS", "alice")
    .args(["--now-override", NOW, "--tz", "utc"]);

  let out = c.output().unwrap();
  assert!(!out.status.success());
  assert!(String::from_utf8_lossy(&out.stderr).contains("fetching merge requests from gitlab"));
}
