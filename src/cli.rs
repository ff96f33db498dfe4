// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Command-line surface and its merge with environment settings into one EffectiveConfig
// role: cli/normalization
// inputs: Parsed Cli flags and Settings
// outputs: Immutable EffectiveConfig passed to the pipeline and outputs
// invariants: CLI flags beat environment settings; the result is never mutated after normalize
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::Parser;

use crate::config::Settings;
use crate::model::{CountMode, StateFilter, TimestampBasis};
use crate::output::{OutputFormat, ViewMode};
use crate::source::SourceKind;
use crate::window::{parse_now_override, WindowSelector, Zone};

#[derive(Parser, Debug)]
#[command(
    name = "merge-champ",
    version,
    about = "Rank team merge-request activity for this week and month",
    long_about = None
)]
pub struct Cli {
  /// Use deterministic sample data instead of a hosting API
  #[arg(long)]
  pub sample: bool,

  /// Any day of the week to report, e.g. 2025-09-03
  #[arg(long)]
  pub week: Option<String>,

  /// Whole weeks back from the current week (0 = current)
  #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
  pub week_offset: i64,

  /// Calendar month to report, e.g. 2025-09
  #[arg(long)]
  pub month: Option<String>,

  /// Whole months back from the current month (0 = current)
  #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
  pub month_offset: i64,

  /// Shorthand for --count-mode weighted
  #[arg(long, conflicts_with = "count_mode")]
  pub weighted: bool,

  /// Rank by raw merge-request count or by size-weighted score [env: COUNT_MODE]
  ///
  /// Weighted scores use MR_WEIGHT_RULES, e.g. "20:0.3,80:0.6,200:1.0" (threshold:weight).
  /// Thresholds must be distinct and weights must not decrease as thresholds grow.
  #[arg(long, value_enum)]
  pub count_mode: Option<CountMode>,

  /// Which merge requests count [env: MR_STATE_FILTER]
  #[arg(long = "state", value_enum)]
  pub state: Option<StateFilter>,

  /// Timestamp that places a merge request in a window [env: MR_TIMESTAMP_FIELD]
  #[arg(long = "timestamp", value_enum)]
  pub timestamp: Option<TimestampBasis>,

  /// Record source; auto-detected from the environment when omitted [env: MERGE_CHAMP_SOURCE]
  #[arg(long, value_enum)]
  pub source: Option<SourceKind>,

  /// Zone for window boundaries: local, utc, or an IANA name [env: MERGE_CHAMP_TZ]
  #[arg(long)]
  pub tz: Option<String>,

  /// Console layout
  #[arg(long, value_enum, default_value_t = ViewMode::Combined)]
  pub view: ViewMode,

  /// Stdout format
  #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
  pub format: OutputFormat,

  /// Post the summary to the Teams webhook in TEAMS_WEBHOOK_URL
  #[arg(long)]
  pub send_teams: bool,

  /// Print the Teams request body instead of posting it
  #[arg(long)]
  pub teams_debug: bool,

  /// Disable ANSI colours in console output
  #[arg(long)]
  pub no_color: bool,

  /// Read settings from this file instead of ./.env
  #[arg(long)]
  pub env_file: Option<PathBuf>,

  /// Debug-level logging (RUST_LOG still wins)
  #[arg(short, long)]
  pub verbose: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
  pub settings: Settings,
  pub sample: bool,
  pub source: Option<SourceKind>,
  pub selector: WindowSelector,
  pub zone: Zone,
  pub count_mode: CountMode,
  pub state_filter: StateFilter,
  pub timestamp_basis: TimestampBasis,
  pub view: ViewMode,
  pub format: OutputFormat,
  pub send_teams: bool,
  pub teams_debug: bool,
  pub color: bool,
  pub now_override: Option<DateTime<Utc>>,
}

pub fn normalize(cli: Cli, settings: Settings) -> Result<EffectiveConfig> {
  let zone = match cli.tz.as_deref() {
    Some(raw) => raw.parse::<Zone>()?,
    None => settings.zone.unwrap_or_default(),
  };

  let now_override = match cli.now_override.as_deref() {
    Some(raw) => match parse_now_override(raw, zone) {
      Some(now) => Some(now),
      None => bail!("invalid --now-override '{raw}', expected RFC3339 or YYYY-MM-DDTHH:MM:SS"),
    },
    None => None,
  };

  let count_mode = if cli.weighted { CountMode::Weighted } else { cli.count_mode.or(settings.count_mode).unwrap_or_default() };

  Ok(EffectiveConfig {
    sample: cli.sample || cli.source == Some(SourceKind::Sample),
    source: cli.source.or(settings.source),
    selector: WindowSelector { week: cli.week, week_offset: cli.week_offset, month: cli.month, month_offset: cli.month_offset },
    zone,
    count_mode,
    state_filter: cli.state.or(settings.state_filter).unwrap_or_default(),
    timestamp_basis: cli.timestamp.or(settings.timestamp_basis).unwrap_or_default(),
    view: cli.view,
    format: cli.format,
    send_teams: cli.send_teams || cli.teams_debug,
    teams_debug: cli.teams_debug,
    color: !cli.no_color,
    now_override,
    settings,
  })
}
