// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fetch merge requests from the GitLab REST API (group or project scope) and resolve change sizes
// role: source/gitlab
// inputs: GITLAB_URL, GITLAB_TOKEN, GROUP_ID or PROJECT_ID, fetch span, activity policy
// outputs: MergeRequestRecord list covering the fetch span
// side_effects: Network calls to {GITLAB_URL}/api/v4
// invariants:
// - Pagination stops on an empty page or a page shorter than per_page
// - List failures fail the fetch; size lookups are best-effort and only logged
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use anyhow::{bail, Result};
use chrono::SecondsFormat;
use serde_json::Value;
use tracing::{debug, warn};

use crate::ext::serde_json::JsonFetch;
use crate::model::{MergeRequestRecord, MrState, Roster, StateFilter, TimestampBasis};
use crate::source::{http, MergeRequestSource};
use crate::window::TimeWindow;

pub const DEFAULT_PER_PAGE: u32 = 100;

const LIST_SIZE_PATHS: &[&str] =
  &["lines_changed", "changes_count", "statistics.total_changes", "statistics.total", "statistics.changes"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitlabScope {
  Group(String),
  Project(String),
}

impl GitlabScope {
  fn list_path(&self) -> String {
    match self {
      GitlabScope::Group(id) => format!("/groups/{}/merge_requests", encode_id(id)),
      GitlabScope::Project(id) => format!("/projects/{}/merge_requests", encode_id(id)),
    }
  }

  fn project_id(&self) -> Option<&str> {
    match self {
      GitlabScope::Project(id) => Some(id),
      GitlabScope::Group(_) => None,
    }
  }
}

/// Numeric ids pass through; "group/sub" paths are percent-encoded.
fn encode_id(id: &str) -> String {
  id.replace('/', "%2F")
}

// --- Trait seam for the GitLab API ---
pub trait GitlabApi {
  fn list_merge_requests(&self, scope: &GitlabScope, query: &[(&str, String)]) -> Result<Value>;
  fn merge_request_details(&self, project_id: &str, iid: &str) -> Result<Value>;
  fn merge_request_changes(&self, project_id: &str, iid: &str) -> Result<Value>;
}

pub struct GitlabHttpApi {
  base_url: String,
  token: String,
  agent: ureq::Agent,
}

impl GitlabHttpApi {
  pub fn new(base_url: &str, token: String, timeout: Duration) -> Self {
    Self { base_url: base_url.trim_end_matches('/').to_string(), token, agent: http::agent(timeout) }
  }

  fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
    let url = format!("{}/api/v4{}", self.base_url, path);
    http::get_json(&self.agent, &url, &[("PRIVATE-TOKEN", self.token.as_str())], query)
  }
}

impl GitlabApi for GitlabHttpApi {
  fn list_merge_requests(&self, scope: &GitlabScope, query: &[(&str, String)]) -> Result<Value> {
    self.get(&scope.list_path(), query)
  }

  fn merge_request_details(&self, project_id: &str, iid: &str) -> Result<Value> {
    let path = format!("/projects/{}/merge_requests/{}", encode_id(project_id), iid);
    self.get(&path, &[("include_stats", "true".to_string())])
  }

  fn merge_request_changes(&self, project_id: &str, iid: &str) -> Result<Value> {
    let path = format!("/projects/{}/merge_requests/{}/changes", encode_id(project_id), iid);
    self.get(&path, &[])
  }
}

pub struct GitlabSource {
  api: Box<dyn GitlabApi>,
  scope: GitlabScope,
  state_filter: StateFilter,
  timestamp_basis: TimestampBasis,
  per_page: u32,
  /// Members whose unsized records get a detail lookup; `None` disables lookups.
  size_lookup: Option<Roster>,
}

impl GitlabSource {
  pub fn new(api: Box<dyn GitlabApi>, scope: GitlabScope, state_filter: StateFilter, timestamp_basis: TimestampBasis) -> Self {
    Self { api, scope, state_filter, timestamp_basis, per_page: DEFAULT_PER_PAGE, size_lookup: None }
  }

  pub fn with_per_page(mut self, per_page: u32) -> Self {
    self.per_page = per_page.max(1);
    self
  }

  pub fn with_size_lookup(mut self, roster: Option<Roster>) -> Self {
    self.size_lookup = roster;
    self
  }

  fn base_query(&self, span: &TimeWindow) -> Vec<(&'static str, String)> {
    let state = match self.state_filter {
      StateFilter::Merged => "merged",
      StateFilter::All => "all",
    };
    let mut q = vec![("state", state.to_string()), ("per_page", self.per_page.to_string())];

    let start = span.start.to_rfc3339_opts(SecondsFormat::Secs, true);
    match self.timestamp_basis {
      TimestampBasis::Created => {
        q.push(("created_after", start));
        q.push(("created_before", span.end.to_rfc3339_opts(SecondsFormat::Secs, true)));
      }
      // A merge inside the span always updates the merge request inside it too.
      TimestampBasis::Merged => q.push(("updated_after", start)),
    }

    if matches!(self.scope, GitlabScope::Group(_)) {
      q.push(("include_subgroups", "true".to_string()));
    }

    q
  }

  fn map_item(&self, item: &Value) -> Option<(MergeRequestRecord, Option<String>, Option<String>)> {
    let author = item.fetch("author.username").to::<String>()?;
    let iid = item.fetch("iid").to_text();
    let id = match &iid {
      Some(iid) => format!("!{iid}"),
      None => item.fetch("id").to_text().unwrap_or_else(|| "unknown".into()),
    };
    let merged_at = item.fetch("merged_at").to::<String>();
    let state = MrState::from_api(&item.fetch("state").to_or_default::<String>(), merged_at.is_some());
    let project_id = ["project_id", "project.id", "target_project_id", "source_project_id"]
      .iter()
      .find_map(|p| item.fetch(p).to_text())
      .or_else(|| self.scope.project_id().map(str::to_string));

    let record = MergeRequestRecord {
      id,
      author,
      title: item.fetch("title").to_or_default(),
      state,
      created_at: item.fetch("created_at").to(),
      merged_at,
      change_size: list_item_size(item),
      web_url: item.fetch("web_url").to(),
    };

    Some((record, project_id, iid))
  }

  fn wants_size_lookup(&self, record: &MergeRequestRecord) -> bool {
    record.change_size.is_none() && self.size_lookup.as_ref().is_some_and(|r| r.contains(&record.author))
  }

  /// Detail endpoint first, then diff parsing of the changes endpoint.
  fn lookup_size(&self, project_id: &str, iid: &str) -> Option<u64> {
    let details = match self.api.merge_request_details(project_id, iid) {
      Ok(v) => v,
      Err(e) => {
        warn!("size lookup for project {project_id} !{iid} failed: {e:#}");
        return None;
      }
    };

    let resolved = size_from_details(&details);
    if let DetailSize::Exact(n) = resolved {
      return Some(n);
    }

    let from_changes = if resolved.stats_provided() {
      None
    } else {
      match self.api.merge_request_changes(project_id, iid) {
        Ok(v) => size_from_changes(&v),
        Err(e) => {
          warn!("changes lookup for project {project_id} !{iid} failed: {e:#}");
          None
        }
      }
    };

    match (from_changes, resolved) {
      (Some(n), _) => Some(n),
      (None, DetailSize::Candidate { best, .. }) => best,
      (None, DetailSize::Exact(n)) => Some(n),
    }
  }
}

impl MergeRequestSource for GitlabSource {
  fn name(&self) -> &'static str {
    "gitlab"
  }

  fn fetch_merge_requests(&self, span: &TimeWindow) -> Result<Vec<MergeRequestRecord>> {
    let base = self.base_query(span);
    let mut out: Vec<MergeRequestRecord> = Vec::new();
    let mut page = 1u32;

    loop {
      let mut query = base.clone();
      query.push(("page", page.to_string()));

      let v = self.api.list_merge_requests(&self.scope, &query)?;
      let Some(items) = v.as_array() else {
        bail!("unexpected GitLab response for {:?} page {page}: expected an array", self.scope);
      };

      debug!(page, items = items.len(), "fetched GitLab merge request page");

      for item in items {
        let Some((mut record, project_id, iid)) = self.map_item(item) else {
          warn!("skipping GitLab merge request without author: {}", item.fetch("web_url").to_or_default::<String>());
          continue;
        };

        if self.wants_size_lookup(&record) {
          record.change_size = match (project_id.as_deref(), iid.as_deref()) {
            (Some(pid), Some(iid)) => self.lookup_size(pid, iid),
            _ => {
              debug!("merge request {} has no project id or iid; size stays unknown", record.id);
              None
            }
          };
          debug!(id = %record.id, author = %record.author, size = ?record.change_size, "resolved change size");
        }

        out.push(record);
      }

      if items.is_empty() || items.len() < self.per_page as usize {
        break;
      }
      page += 1;
    }

    Ok(out)
  }
}

/// Size from the list payload: the first numeric candidate, then
/// `statistics.additions + statistics.deletions`.
pub fn list_item_size(item: &Value) -> Option<u64> {
  item.first_count(LIST_SIZE_PATHS).or_else(|| additions_plus_deletions(item, "statistics"))
}

fn additions_plus_deletions(v: &Value, prefix: &str) -> Option<u64> {
  let path = |k: &str| if prefix.is_empty() { k.to_string() } else { format!("{prefix}.{k}") };
  let a = v.fetch(&path("additions")).to_count();
  let d = v.fetch(&path("deletions")).to_count();
  match (a, d) {
    (None, None) => None,
    (a, d) => Some(a.unwrap_or(0) + d.unwrap_or(0)),
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailSize {
  Exact(u64),
  Candidate { best: Option<u64>, stats_provided: bool },
}

impl DetailSize {
  fn stats_provided(&self) -> bool {
    match self {
      DetailSize::Exact(_) => true,
      DetailSize::Candidate { stats_provided, .. } => *stats_provided,
    }
  }
}

fn size_from_details(details: &Value) -> DetailSize {
  let stats_key = ["statistics", "stats", "diff_stats"].into_iter().find(|k| details.fetch(k).value().is_some_and(Value::is_object));

  let mut stats_provided = false;
  let mut candidates: Vec<u64> = ["changes_count", "total_changes", "changes"].iter().filter_map(|p| details.fetch(p).to_count()).collect();

  // Phase 1: additions + deletions, nested stats first
  for prefix in stats_key.into_iter().chain(std::iter::once("")) {
    if let Some(total) = additions_plus_deletions(details, prefix) {
      stats_provided = true;
      if total > 0 {
        return DetailSize::Exact(total);
      }
    }
  }

  // Phase 2: loose numeric candidates
  if let Some(key) = stats_key {
    let nested: Vec<u64> = ["total", "total_changes", "changes"].iter().filter_map(|k| details.fetch(&format!("{key}.{k}")).to_count()).collect();
    stats_provided = stats_provided || nested.iter().any(|n| *n > 0);
    candidates.extend(nested);
  }

  DetailSize::Candidate { best: candidates.into_iter().max(), stats_provided }
}

/// Count added and removed lines in unified diffs, ignoring file and hunk headers.
pub fn count_diff_lines(diff: &str) -> u64 {
  diff
    .lines()
    .filter(|l| !(l.starts_with("+++") || l.starts_with("---") || l.starts_with("@@")))
    .filter(|l| l.starts_with('+') || l.starts_with('-'))
    .count() as u64
}

fn size_from_changes(v: &Value) -> Option<u64> {
  let changes = v.fetch("changes").value()?.as_array()?;
  Some(changes.iter().map(|c| count_diff_lines(&c.fetch("diff").to_or_default::<String>())).sum())
}
