// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Assemble the read-only report (ranked windows, summaries, warnings, message) consumed by every output channel
// role: report model
// outputs: Report serialised as-is by the JSON channel
// invariants: Renderers never mutate the report; the message is chosen from the monthly total of the active metric
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::{round2, Aggregation, WindowAggregate};
use crate::model::{ActivityPolicy, CountMode, RankedRow};
use crate::rank::{rank, Decorations};
use crate::window::WindowKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
  High,
  Medium,
  Encouraging,
}

impl ActivityLevel {
  pub fn from_total(total: f64) -> Self {
    if total >= 20.0 {
      ActivityLevel::High
    } else if total >= 5.0 {
      ActivityLevel::Medium
    } else {
      ActivityLevel::Encouraging
    }
  }

  pub fn message(self) -> &'static str {
    match self {
      ActivityLevel::High => "🚀 Amazing work this week!",
      ActivityLevel::Medium => "📈 Great progress everyone!",
      ActivityLevel::Encouraging => "🌟 Every contribution matters!",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSummary {
  pub total_count: u32,
  pub total_weighted: f64,
  pub other_activity: u32,
  pub active_members: usize,
  pub roster_size: usize,
  /// Percentage with one decimal.
  pub participation_rate: f64,
  pub top_contributor: Option<String>,
  pub top_metric: f64,
}

impl WindowSummary {
  pub fn total(&self, mode: CountMode) -> f64 {
    match mode {
      CountMode::Raw => f64::from(self.total_count),
      CountMode::Weighted => self.total_weighted,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowReport {
  pub label: String,
  pub kind: WindowKind,
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
  pub rows: Vec<RankedRow>,
  pub summary: WindowSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
  pub generated_at: DateTime<Utc>,
  pub count_mode: CountMode,
  pub activity: ActivityPolicy,
  pub sample: bool,
  pub week: WindowReport,
  pub month: WindowReport,
  pub skipped_records: usize,
  pub warnings: Vec<String>,
  pub filtered_by_state: u32,
  pub activity_level: ActivityLevel,
  pub message: String,
}

fn window_report(agg: WindowAggregate, decorations: &Decorations) -> WindowReport {
  let mode = agg.count_mode;
  let rows = rank(&agg.stats, mode, decorations);

  let total_count: u32 = agg.stats.iter().map(|s| s.raw_count).sum();
  let total_weighted = round2(agg.stats.iter().map(|s| s.weighted_score).sum());
  let active_members = agg.stats.iter().filter(|s| s.participated).count();
  let roster_size = agg.stats.len();
  let participation_rate = if roster_size == 0 {
    0.0
  } else {
    (active_members as f64 / roster_size as f64 * 1000.0).round() / 10.0
  };

  let top = rows.first().filter(|r| r.stat.metric(mode) > 0.0);
  let summary = WindowSummary {
    total_count,
    total_weighted,
    other_activity: agg.other_activity,
    active_members,
    roster_size,
    participation_rate,
    top_contributor: top.map(|r| r.stat.member.clone()),
    top_metric: top.map(|r| r.stat.metric(mode)).unwrap_or(0.0),
  };

  WindowReport {
    label: agg.window.label,
    kind: agg.window.kind,
    start: agg.window.start,
    end: agg.window.end,
    rows,
    summary,
  }
}

/// Rank both windows and derive summaries, warnings and the message.
pub fn build_report(
  aggregation: Aggregation,
  decorations: &Decorations,
  activity: ActivityPolicy,
  generated_at: DateTime<Utc>,
  sample: bool,
) -> Report {
  let count_mode = aggregation.month.count_mode;
  let warnings: Vec<String> = aggregation.skipped.iter().map(ToString::to_string).collect();

  let week = window_report(aggregation.week, decorations);
  let month = window_report(aggregation.month, decorations);
  let activity_level = ActivityLevel::from_total(month.summary.total(count_mode));

  Report {
    generated_at,
    count_mode,
    activity,
    sample,
    week,
    month,
    skipped_records: warnings.len(),
    warnings,
    filtered_by_state: aggregation.filtered_by_state,
    activity_level,
    message: activity_level.message().to_string(),
  }
}
