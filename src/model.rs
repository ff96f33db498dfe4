// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the in-memory model (records, roster, per-member stats, ranked rows, activity policy) shared by the core and outputs
// role: model/types
// outputs: Serializable structs with stable snake_case field names
// invariants: Records are immutable once fetched; MemberStat is never mutated after aggregation; roster entries are unique
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MrState {
  Open,
  Merged,
  Closed,
}

impl MrState {
  /// Map a hosting-API state string. `merged_at` wins over a plain "closed"
  /// because GitHub reports merged pull requests as closed.
  pub fn from_api(state: &str, has_merged_at: bool) -> Self {
    match state.to_ascii_lowercase().as_str() {
      "merged" => MrState::Merged,
      "closed" if has_merged_at => MrState::Merged,
      "closed" => MrState::Closed,
      _ if has_merged_at => MrState::Merged,
      _ => MrState::Open,
    }
  }
}

/// One merge request as delivered by a record source.
///
/// Timestamps stay raw strings: parsing happens in the aggregator so a single
/// malformed record is skipped instead of failing the whole fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeRequestRecord {
  pub id: String,
  pub author: String,
  #[serde(default)]
  pub title: String,
  pub state: MrState,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub created_at: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub merged_at: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub change_size: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub web_url: Option<String>,
}

impl MergeRequestRecord {
  /// Lines changed; an unknown size counts as zero.
  pub fn size(&self) -> u64 {
    self.change_size.unwrap_or(0)
  }

  pub fn link(&self) -> &str {
    self.web_url.as_deref().unwrap_or("N/A")
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum CountMode {
  #[default]
  Raw,
  Weighted,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum StateFilter {
  All,
  #[default]
  Merged,
}

impl StateFilter {
  pub fn admits(self, state: MrState) -> bool {
    match self {
      StateFilter::All => true,
      StateFilter::Merged => state == MrState::Merged,
    }
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum TimestampBasis {
  #[default]
  Created,
  Merged,
}

impl TimestampBasis {
  pub fn field(self) -> &'static str {
    match self {
      TimestampBasis::Created => "created_at",
      TimestampBasis::Merged => "merged_at",
    }
  }

  pub fn pick(self, record: &MergeRequestRecord) -> Option<&str> {
    match self {
      TimestampBasis::Created => record.created_at.as_deref(),
      TimestampBasis::Merged => record.merged_at.as_deref(),
    }
  }
}

/// Which records count as activity and which timestamp buckets them.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize)]
pub struct ActivityPolicy {
  pub state_filter: StateFilter,
  pub timestamp_basis: TimestampBasis,
}

impl ActivityPolicy {
  pub fn new(state_filter: StateFilter, timestamp_basis: TimestampBasis) -> Result<Self, ConfigurationError> {
    if state_filter == StateFilter::All && timestamp_basis == TimestampBasis::Merged {
      return Err(ConfigurationError::IncompatibleActivityPolicy);
    }

    Ok(Self { state_filter, timestamp_basis })
  }
}

macro_rules! impl_setting_enum {
  ($ty:ty, $key:literal, $expected:literal, { $($text:literal => $variant:expr),+ $(,)? }) => {
    impl FromStr for $ty {
      type Err = ConfigurationError;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
          $($text => Ok($variant),)+
          _ => Err(ConfigurationError::InvalidSetting { key: $key, value: s.to_string(), expected: $expected }),
        }
      }
    }
  };
}

impl_setting_enum!(CountMode, "COUNT_MODE", "raw, weighted", { "raw" => CountMode::Raw, "weighted" => CountMode::Weighted });
impl_setting_enum!(StateFilter, "MR_STATE_FILTER", "merged, all", { "merged" => StateFilter::Merged, "all" => StateFilter::All });
impl_setting_enum!(TimestampBasis, "MR_TIMESTAMP_FIELD", "created, merged", { "created" => TimestampBasis::Created, "merged" => TimestampBasis::Merged });

impl fmt::Display for CountMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CountMode::Raw => f.write_str("raw"),
      CountMode::Weighted => f.write_str("weighted"),
    }
  }
}

/// The configured team. Order is kept as configured; duplicates and blank
/// entries are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Roster {
  members: Vec<String>,
}

impl Roster {
  pub fn new<I, S>(members: I) -> Result<Self, ConfigurationError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut out: Vec<String> = Vec::new();

    for m in members {
      let m = m.as_ref().trim();
      if m.is_empty() || out.iter().any(|existing| existing == m) {
        continue;
      }
      out.push(m.to_string());
    }

    if out.is_empty() {
      return Err(ConfigurationError::EmptyRoster);
    }

    Ok(Self { members: out })
  }

  /// Parse a comma-separated `TEAM_MEMBERS` value.
  pub fn parse(list: &str) -> Result<Self, ConfigurationError> {
    Self::new(list.split(','))
  }

  pub fn members(&self) -> &[String] {
    &self.members
  }

  pub fn contains(&self, name: &str) -> bool {
    self.members.iter().any(|m| m == name)
  }

  pub fn len(&self) -> usize {
    self.members.len()
  }

  pub fn is_empty(&self) -> bool {
    self.members.is_empty()
  }

  /// Members in alphabetical order (the order decorations are assigned in).
  pub fn sorted(&self) -> Vec<&str> {
    let mut v: Vec<&str> = self.members.iter().map(String::as_str).collect();
    v.sort_unstable();
    v
  }
}

/// Activity of one roster member inside one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberStat {
  pub member: String,
  pub raw_count: u32,
  pub weighted_score: f64,
  pub participated: bool,
}

impl MemberStat {
  pub fn zero(member: impl Into<String>) -> Self {
    Self { member: member.into(), raw_count: 0, weighted_score: 0.0, participated: false }
  }

  /// The value rankings compare under `mode`.
  pub fn metric(&self, mode: CountMode) -> f64 {
    match mode {
      CountMode::Raw => f64::from(self.raw_count),
      CountMode::Weighted => self.weighted_score,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
  pub stat: MemberStat,
  pub rank: u32,
  pub decoration: String,
}
