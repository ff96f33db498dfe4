// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fetch pull requests from the GitHub REST API as merge-request records
// role: source/github
// inputs: GITHUB_REPOSITORY or REPOSITORY_URL; GITHUB_TOKEN, GH_TOKEN or `gh auth token`; fetch span
// outputs: MergeRequestRecord list covering the fetch span
// side_effects: Network calls to GITHUB_API_URL; spawns `gh` when no token is configured
// invariants:
// - Repository parser only recognizes owner/name or github.com remotes (https or ssh)
// - Listing is newest-first and stops once a page reaches past the span start
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::{debug, warn};

use crate::ext::serde_json::JsonFetch;
use crate::model::{MergeRequestRecord, MrState, Roster, StateFilter, TimestampBasis};
use crate::source::{http, MergeRequestSource};
use crate::window::{parse_record_timestamp, TimeWindow};

pub const DEFAULT_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
  pub owner: String,
  pub name: String,
}

impl std::fmt::Display for RepoRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}/{}", self.owner, self.name)
  }
}

/// Parse `owner/name` or a github.com remote URL.
pub fn parse_repository(raw: &str) -> Option<RepoRef> {
  static RE_REMOTE: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"^(?:git@github\.com:|https?://github\.com/)([^/]+)/([^/]+?)(?:\.git)?/?$").expect("valid regex")
  });
  static RE_SLUG: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)$").expect("valid regex"));

  let raw = raw.trim();
  let caps = RE_REMOTE.captures(raw).or_else(|| RE_SLUG.captures(raw))?;

  Some(RepoRef { owner: caps.get(1)?.as_str().to_string(), name: caps.get(2)?.as_str().trim_end_matches(".git").to_string() })
}

/// `gh auth token`, when the GitHub CLI is installed and logged in.
pub fn gh_cli_token() -> Option<String> {
  let output = std::process::Command::new("gh").args(["auth", "token"]).output().ok()?;
  if !output.status.success() {
    return None;
  }

  let t = String::from_utf8_lossy(&output.stdout).trim().to_string();
  (!t.is_empty()).then_some(t)
}

// --- Trait seam for the GitHub API ---
pub trait GithubApi {
  fn list_pulls(&self, repo: &RepoRef, query: &[(&str, String)]) -> Result<Value>;
  fn pull_details(&self, repo: &RepoRef, number: u64) -> Result<Value>;
}

pub struct GithubHttpApi {
  base_url: String,
  token: String,
  agent: ureq::Agent,
}

impl GithubHttpApi {
  pub fn new(base_url: &str, token: String, timeout: Duration) -> Self {
    Self { base_url: base_url.trim_end_matches('/').to_string(), token, agent: http::agent(timeout) }
  }

  fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
    let url = format!("{}{}", self.base_url, path);
    let auth = format!("Bearer {}", self.token);
    http::get_json(
      &self.agent,
      &url,
      &[("Accept", "application/vnd.github+json"), ("Authorization", auth.as_str()), ("X-GitHub-Api-Version", "2022-11-28")],
      query,
    )
  }
}

impl GithubApi for GithubHttpApi {
  fn list_pulls(&self, repo: &RepoRef, query: &[(&str, String)]) -> Result<Value> {
    self.get(&format!("/repos/{}/{}/pulls", repo.owner, repo.name), query)
  }

  fn pull_details(&self, repo: &RepoRef, number: u64) -> Result<Value> {
    self.get(&format!("/repos/{}/{}/pulls/{}", repo.owner, repo.name, number), &[])
  }
}

pub struct GithubSource {
  api: Box<dyn GithubApi>,
  repo: RepoRef,
  state_filter: StateFilter,
  timestamp_basis: TimestampBasis,
  per_page: u32,
  size_lookup: Option<Roster>,
}

impl GithubSource {
  pub fn new(api: Box<dyn GithubApi>, repo: RepoRef, state_filter: StateFilter, timestamp_basis: TimestampBasis) -> Self {
    Self { api, repo, state_filter, timestamp_basis, per_page: DEFAULT_PER_PAGE, size_lookup: None }
  }

  pub fn with_per_page(mut self, per_page: u32) -> Self {
    self.per_page = per_page.clamp(1, 100);
    self
  }

  pub fn with_size_lookup(mut self, roster: Option<Roster>) -> Self {
    self.size_lookup = roster;
    self
  }

  /// Newest-first ordering on the field that bounds the span.
  fn sort_field(&self) -> &'static str {
    match self.timestamp_basis {
      TimestampBasis::Created => "created",
      TimestampBasis::Merged => "updated",
    }
  }

  fn query(&self, page: u32) -> Vec<(&'static str, String)> {
    let state = match self.state_filter {
      StateFilter::Merged => "closed",
      StateFilter::All => "all",
    };

    vec![
      ("state", state.to_string()),
      ("sort", self.sort_field().to_string()),
      ("direction", "desc".to_string()),
      ("per_page", self.per_page.to_string()),
      ("page", page.to_string()),
    ]
  }

  fn map_item(&self, item: &Value) -> Option<MergeRequestRecord> {
    let author = item.fetch("user.login").to::<String>()?;
    let number = item.fetch("number").to_text().unwrap_or_else(|| "?".into());
    let merged_at = item.fetch("merged_at").to::<String>();
    let state = MrState::from_api(&item.fetch("state").to_or_default::<String>(), merged_at.is_some());

    Some(MergeRequestRecord {
      id: format!("#{number}"),
      author,
      title: item.fetch("title").to_or_default(),
      state,
      created_at: item.fetch("created_at").to(),
      merged_at,
      change_size: additions_plus_deletions(item),
      web_url: item.fetch("html_url").to(),
    })
  }

  fn lookup_size(&self, item: &Value) -> Option<u64> {
    let number = item.fetch("number").to_count()?;
    match self.api.pull_details(&self.repo, number) {
      Ok(details) => additions_plus_deletions(&details),
      Err(e) => {
        warn!("size lookup for {}#{number} failed: {e:#}", self.repo);
        None
      }
    }
  }

  /// True once the oldest item on a page predates the span start.
  fn page_reaches_past(&self, items: &[Value], span: &TimeWindow) -> bool {
    let field = match self.timestamp_basis {
      TimestampBasis::Created => "created_at",
      TimestampBasis::Merged => "updated_at",
    };

    items
      .iter()
      .filter_map(|i| i.fetch(field).to::<String>())
      .filter_map(|s| parse_record_timestamp(&s))
      .min()
      .is_some_and(|oldest| oldest < span.start)
  }
}

fn additions_plus_deletions(v: &Value) -> Option<u64> {
  let a = v.fetch("additions").to_count()?;
  let d = v.fetch("deletions").to_count()?;
  Some(a + d)
}

impl MergeRequestSource for GithubSource {
  fn name(&self) -> &'static str {
    "github"
  }

  fn fetch_merge_requests(&self, span: &TimeWindow) -> Result<Vec<MergeRequestRecord>> {
    let mut out: Vec<MergeRequestRecord> = Vec::new();
    let mut page = 1u32;

    loop {
      let v = self.api.list_pulls(&self.repo, &self.query(page))?;
      let Some(items) = v.as_array() else {
        bail!("unexpected GitHub response for {} page {page}: expected an array", self.repo);
      };

      debug!(page, items = items.len(), "fetched GitHub pull request page");

      for item in items {
        let Some(mut record) = self.map_item(item) else {
          warn!("skipping GitHub pull request without user: {}", item.fetch("html_url").to_or_default::<String>());
          continue;
        };

        let wanted = self.size_lookup.as_ref().is_some_and(|r| r.contains(&record.author));
        if record.change_size.is_none() && wanted {
          record.change_size = self.lookup_size(item);
        }

        out.push(record);
      }

      if items.len() < self.per_page as usize || self.page_reaches_past(items, span) {
        break;
      }
      page += 1;
    }

    Ok(out)
  }
}
