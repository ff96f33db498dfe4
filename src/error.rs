// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed errors raised by the core before and during aggregation
// role: errors/types
// outputs: ConfigurationError (fatal, raised before aggregation) and DataError (per-record, skipped and counted)
// invariants:
// - ConfigurationError is never retried and is surfaced verbatim
// - DataError never aborts an aggregation; it is collected for summary warnings
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
  #[error("invalid --week '{0}', expected YYYY-MM-DD")]
  InvalidWeek(String),

  #[error("invalid --month '{0}', expected YYYY-MM")]
  InvalidMonth(String),

  #[error("{name} must not be negative (got {value})")]
  NegativeOffset { name: &'static str, value: i64 },

  #[error("{0} does not exist in the configured time zone")]
  UnrepresentableInstant(String),

  #[error("invalid weight rule '{entry}': {reason}")]
  InvalidWeightRule { entry: String, reason: String },

  #[error("weight rule thresholds must be strictly increasing (threshold {0} appears more than once)")]
  DuplicateThreshold(u64),

  #[error("weight rule weights must not decrease as thresholds grow ({threshold}:{weight} follows a larger weight)")]
  DecreasingWeight { threshold: u64, weight: f64 },

  #[error("team roster is empty; set TEAM_MEMBERS to a comma-separated list of usernames")]
  EmptyRoster,

  #[error("invalid value '{value}' for {key}; expected one of: {expected}")]
  InvalidSetting { key: &'static str, value: String, expected: &'static str },

  #[error("invalid time zone '{0}'; expected local, utc, or an IANA name such as Europe/Berlin")]
  InvalidZone(String),

  #[error("the merged timestamp basis only applies to merged merge requests; use --state merged or --timestamp created")]
  IncompatibleActivityPolicy,

  #[error("no record source configured; set GITLAB_TOKEN with GROUP_ID or PROJECT_ID, or GITHUB_REPOSITORY with a GitHub token, or run with --sample")]
  NoSource,

  #[error("{source_name} source requires {missing}")]
  MissingSetting { source_name: &'static str, missing: &'static str },

  #[error("--send-teams requires TEAMS_WEBHOOK_URL (or use --teams-debug)")]
  MissingWebhook,
}

/// A record that could not be placed in any window.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataError {
  #[error("merge request {id} by {author} has no {field} timestamp")]
  MissingTimestamp { id: String, author: String, field: &'static str },

  #[error("merge request {id} by {author} has an unparseable {field} timestamp '{value}'")]
  InvalidTimestamp { id: String, author: String, field: &'static str, value: String },
}
