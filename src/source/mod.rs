// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Record-source capability trait and backend selection (GitLab, GitHub, sample)
// role: source/selection
// inputs: EffectiveConfig settings; roster and weight policy for size lookups
// outputs: Boxed MergeRequestSource
// invariants:
// - The core depends only on MergeRequestSource
// - Selection errors are ConfigurationErrors raised before any fetch
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod github;
pub mod gitlab;
pub mod http;
pub mod sample;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use tracing::info;

use crate::cli::EffectiveConfig;
use crate::error::ConfigurationError;
use crate::model::{CountMode, MergeRequestRecord, Roster};
use crate::weight::WeightPolicy;
use crate::window::TimeWindow;

use self::github::{GithubHttpApi, GithubSource, RepoRef};
use self::gitlab::{GitlabHttpApi, GitlabScope, GitlabSource};
use self::sample::SampleSource;

const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can list the merge requests of a span.
pub trait MergeRequestSource {
  fn name(&self) -> &'static str;

  /// Every record whose activity may fall inside `span`. Records outside it
  /// are allowed; the aggregator re-checks window membership.
  fn fetch_merge_requests(&self, span: &TimeWindow) -> Result<Vec<MergeRequestRecord>>;
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum SourceKind {
  Gitlab,
  Github,
  Sample,
}

impl FromStr for SourceKind {
  type Err = ConfigurationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "gitlab" => Ok(SourceKind::Gitlab),
      "github" => Ok(SourceKind::Github),
      "sample" => Ok(SourceKind::Sample),
      _ => Err(ConfigurationError::InvalidSetting {
        key: "MERGE_CHAMP_SOURCE",
        value: s.to_string(),
        expected: "gitlab, github, sample",
      }),
    }
  }
}

impl fmt::Display for SourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SourceKind::Gitlab => f.write_str("gitlab"),
      SourceKind::Github => f.write_str("github"),
      SourceKind::Sample => f.write_str("sample"),
    }
  }
}

/// A fully specified backend, validated but not yet connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
  Gitlab { base_url: String, token: String, scope: GitlabScope },
  Github { api_url: String, token: String, repo: RepoRef },
  Sample,
}

impl SourceSpec {
  pub fn kind(&self) -> SourceKind {
    match self {
      SourceSpec::Gitlab { .. } => SourceKind::Gitlab,
      SourceSpec::Github { .. } => SourceKind::Github,
      SourceSpec::Sample => SourceKind::Sample,
    }
  }
}

fn gitlab_spec(cfg: &EffectiveConfig) -> Result<SourceSpec, ConfigurationError> {
  let s = &cfg.settings;
  let token = s
    .gitlab_token
    .clone()
    .ok_or(ConfigurationError::MissingSetting { source_name: "gitlab", missing: "GITLAB_TOKEN" })?;
  let scope = match (&s.gitlab_group_id, &s.gitlab_project_id) {
    (Some(group), _) => GitlabScope::Group(group.clone()),
    (None, Some(project)) => GitlabScope::Project(project.clone()),
    (None, None) => {
      return Err(ConfigurationError::MissingSetting { source_name: "gitlab", missing: "GROUP_ID or PROJECT_ID" })
    }
  };

  Ok(SourceSpec::Gitlab { base_url: s.gitlab_url.clone(), token, scope })
}

fn github_spec(cfg: &EffectiveConfig, token_fallback: impl FnOnce() -> Option<String>) -> Result<SourceSpec, ConfigurationError> {
  let s = &cfg.settings;
  let raw = s.github_repository.as_deref().ok_or(ConfigurationError::MissingSetting {
    source_name: "github",
    missing: "GITHUB_REPOSITORY or REPOSITORY_URL",
  })?;
  let repo = github::parse_repository(raw).ok_or_else(|| ConfigurationError::InvalidSetting {
    key: "GITHUB_REPOSITORY",
    value: raw.to_string(),
    expected: "owner/name or a github.com URL",
  })?;
  let token = s.github_token.clone().or_else(token_fallback).ok_or(ConfigurationError::MissingSetting {
    source_name: "github",
    missing: "GITHUB_TOKEN, GH_TOKEN or a logged-in `gh` CLI",
  })?;

  Ok(SourceSpec::Github { api_url: s.github_api_url.clone(), token, repo })
}

/// Pick the backend: sample mode, then an explicit choice, then whichever of
/// GitLab or GitHub is configured (GitLab first).
pub fn resolve_spec(cfg: &EffectiveConfig) -> Result<SourceSpec, ConfigurationError> {
  resolve_spec_with(cfg, github::gh_cli_token)
}

pub(crate) fn resolve_spec_with(
  cfg: &EffectiveConfig,
  token_fallback: impl FnOnce() -> Option<String>,
) -> Result<SourceSpec, ConfigurationError> {
  if cfg.sample {
    return Ok(SourceSpec::Sample);
  }

  let s = &cfg.settings;
  match cfg.source {
    Some(SourceKind::Sample) => Ok(SourceSpec::Sample),
    Some(SourceKind::Gitlab) => gitlab_spec(cfg),
    Some(SourceKind::Github) => github_spec(cfg, token_fallback),
    None if s.gitlab_token.is_some() && (s.gitlab_group_id.is_some() || s.gitlab_project_id.is_some()) => gitlab_spec(cfg),
    None if s.github_repository.is_some() => github_spec(cfg, token_fallback),
    None => Err(ConfigurationError::NoSource),
  }
}

/// Connect a validated spec. Size lookups run only when they can change a
/// weighted score.
pub fn build_source(
  spec: &SourceSpec,
  cfg: &EffectiveConfig,
  roster: &Roster,
  policy: &WeightPolicy,
) -> Box<dyn MergeRequestSource> {
  let size_lookup = (cfg.count_mode == CountMode::Weighted && !policy.is_empty()).then(|| roster.clone());

  match spec {
    SourceSpec::Gitlab { base_url, token, scope } => {
      info!("collecting merge requests from GitLab {:?} at {}", scope, base_url);
      let api = GitlabHttpApi::new(base_url, token.clone(), API_TIMEOUT);
      Box::new(
        GitlabSource::new(Box::new(api), scope.clone(), cfg.state_filter, cfg.timestamp_basis).with_size_lookup(size_lookup),
      )
    }
    SourceSpec::Github { api_url, token, repo } => {
      info!("collecting pull requests from GitHub {}", repo);
      let api = GithubHttpApi::new(api_url, token.clone(), API_TIMEOUT);
      Box::new(GithubSource::new(Box::new(api), repo.clone(), cfg.state_filter, cfg.timestamp_basis).with_size_lookup(size_lookup))
    }
    SourceSpec::Sample => {
      info!("using deterministic sample data");
      Box::new(SampleSource::new(roster))
    }
  }
}
