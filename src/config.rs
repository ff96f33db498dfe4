// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Read environment settings (.env plus process env) into an immutable Settings struct
// role: configuration
// inputs: .env file (optional), process environment, or any key lookup in tests
// outputs: Settings with typed enums and defaults applied
// invariants:
// - Blank values count as unset
// - Malformed enum or number values are ConfigurationErrors, never silently defaulted
// - dotenvy never overrides variables already set in the process
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::error::ConfigurationError;
use crate::model::{CountMode, StateFilter, TimestampBasis};
use crate::source::SourceKind;
use crate::window::Zone;

pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TEAMS_TIMEOUT_SECS: u64 = 10;

/// Settings taken from the environment. CLI flags are layered on top in
/// `cli::normalize`.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
  pub gitlab_token: Option<String>,
  pub gitlab_url: String,
  pub gitlab_group_id: Option<String>,
  pub gitlab_project_id: Option<String>,
  pub github_token: Option<String>,
  pub github_api_url: String,
  pub github_repository: Option<String>,
  pub team_members: Option<String>,
  pub weight_rules: Option<String>,
  pub count_mode: Option<CountMode>,
  pub state_filter: Option<StateFilter>,
  pub timestamp_basis: Option<TimestampBasis>,
  pub source: Option<SourceKind>,
  pub zone: Option<Zone>,
  pub teams_webhook_url: Option<String>,
  pub teams_timeout: Duration,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      gitlab_token: None,
      gitlab_url: DEFAULT_GITLAB_URL.to_string(),
      gitlab_group_id: None,
      gitlab_project_id: None,
      github_token: None,
      github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
      github_repository: None,
      team_members: None,
      weight_rules: None,
      count_mode: None,
      state_filter: None,
      timestamp_basis: None,
      source: None,
      zone: None,
      teams_webhook_url: None,
      teams_timeout: Duration::from_secs(DEFAULT_TEAMS_TIMEOUT_SECS),
    }
  }
}

fn parse_opt<T>(value: Option<String>) -> Result<Option<T>, ConfigurationError>
where
  T: std::str::FromStr<Err = ConfigurationError>,
{
  value.map(|v| v.parse::<T>()).transpose()
}

impl Settings {
  /// Build settings from any key lookup (process env in production, a map in tests).
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let defaults = Settings::default();

    let teams_timeout = match get("TEAMS_TIMEOUT_SECS") {
      None => defaults.teams_timeout,
      Some(raw) => match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
          return Err(ConfigurationError::InvalidSetting {
            key: "TEAMS_TIMEOUT_SECS",
            value: raw,
            expected: "a positive number of seconds",
          })
        }
      },
    };

    Ok(Self {
      gitlab_token: get("GITLAB_TOKEN"),
      gitlab_url: get("GITLAB_URL").unwrap_or(defaults.gitlab_url),
      gitlab_group_id: get("GROUP_ID"),
      gitlab_project_id: get("PROJECT_ID"),
      github_token: get("GITHUB_TOKEN").or_else(|| get("GH_TOKEN")),
      github_api_url: get("GITHUB_API_URL").unwrap_or(defaults.github_api_url),
      github_repository: get("GITHUB_REPOSITORY").or_else(|| get("REPOSITORY_URL")),
      team_members: get("TEAM_MEMBERS"),
      weight_rules: get("MR_WEIGHT_RULES"),
      count_mode: parse_opt(get("COUNT_MODE"))?,
      state_filter: parse_opt(get("MR_STATE_FILTER"))?,
      timestamp_basis: parse_opt(get("MR_TIMESTAMP_FIELD"))?,
      source: parse_opt(get("MERGE_CHAMP_SOURCE"))?,
      zone: parse_opt(get("MERGE_CHAMP_TZ"))?,
      teams_webhook_url: get("TEAMS_WEBHOOK_URL"),
      teams_timeout,
    })
  }

  pub fn from_env() -> Result<Self, ConfigurationError> {
    Self::from_lookup(|k| std::env::var(k).ok())
  }

  /// Load `.env` (or `env_file`) into the process environment, then read it.
  pub fn load(env_file: Option<&Path>) -> Result<Self> {
    match env_file {
      Some(path) => {
        dotenvy::from_path(path).with_context(|| format!("loading env file {}", path.display()))?;
        debug!("loaded environment from {}", path.display());
      }
      None => match dotenvy::dotenv() {
        Ok(path) => debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("no .env file found"),
        // A parse error leaves only the lines before it loaded.
        Err(e) => return Err(e).context("loading .env"),
      },
    }

    Ok(Self::from_env()?)
  }
}
