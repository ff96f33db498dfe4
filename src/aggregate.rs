// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Attribute merge-request records to roster members inside the weekly and monthly windows
// role: aggregation core (pure, no IO)
// inputs: Roster, records, resolved windows, weight policy, count mode, activity policy
// outputs: One MemberStat per (member, window), other-activity counters, skipped-record diagnostics
// invariants:
// - Every roster member appears exactly once per window, in roster order
// - A record counts in a window iff start <= t < end
// - Bad timestamps skip the record and never abort the aggregation
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::Serialize;
use tracing::debug;

use crate::error::DataError;
use crate::model::{ActivityPolicy, CountMode, MemberStat, MergeRequestRecord, Roster};
use crate::weight::WeightPolicy;
use crate::window::{parse_record_timestamp, ResolvedWindows, TimeWindow};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateOptions {
  pub count_mode: CountMode,
  pub activity: ActivityPolicy,
}

/// Per-window stats, still unranked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowAggregate {
  pub window: TimeWindow,
  pub count_mode: CountMode,
  pub stats: Vec<MemberStat>,
  pub other_activity: u32,
}

impl WindowAggregate {
  fn empty(window: &TimeWindow, roster: &Roster, count_mode: CountMode) -> Self {
    Self {
      window: window.clone(),
      count_mode,
      stats: roster.members().iter().map(MemberStat::zero).collect(),
      other_activity: 0,
    }
  }

  fn credit(&mut self, member_idx: usize, record: &MergeRequestRecord, weight: f64) {
    let stat = &mut self.stats[member_idx];
    stat.raw_count += 1;
    stat.weighted_score += weight;
    stat.participated = true;

    debug!(
      window = %self.window.label,
      member = %stat.member,
      total = stat.raw_count,
      size = record.size(),
      weight,
      link = record.link(),
      "counted merge request {}",
      record.id
    );
  }

  fn finish(mut self) -> Self {
    for s in &mut self.stats {
      s.weighted_score = round2(s.weighted_score);
    }
    self
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
  pub week: WindowAggregate,
  pub month: WindowAggregate,
  pub skipped: Vec<DataError>,
  pub filtered_by_state: u32,
}

pub(crate) fn round2(v: f64) -> f64 {
  (v * 100.0).round() / 100.0
}

/// Aggregate `records` into per-member stats for both windows.
pub fn aggregate(
  roster: &Roster,
  records: &[MergeRequestRecord],
  windows: &ResolvedWindows,
  policy: &WeightPolicy,
  options: AggregateOptions,
) -> Aggregation {
  let mut week = WindowAggregate::empty(&windows.week, roster, options.count_mode);
  let mut month = WindowAggregate::empty(&windows.month, roster, options.count_mode);
  let mut skipped: Vec<DataError> = Vec::new();
  let mut filtered_by_state = 0u32;

  let basis = options.activity.timestamp_basis;

  for record in records {
    // Phase 1: activity policy
    if !options.activity.state_filter.admits(record.state) {
      filtered_by_state += 1;
      continue;
    }

    // Phase 2: one timestamp parse per record
    let t = match basis.pick(record) {
      None => {
        skipped.push(DataError::MissingTimestamp {
          id: record.id.clone(),
          author: record.author.clone(),
          field: basis.field(),
        });
        continue;
      }
      Some(raw) => match parse_record_timestamp(raw) {
        Some(t) => t,
        None => {
          skipped.push(DataError::InvalidTimestamp {
            id: record.id.clone(),
            author: record.author.clone(),
            field: basis.field(),
            value: raw.to_string(),
          });
          continue;
        }
      },
    };

    // Phase 3: attribution
    let member_idx = roster.members().iter().position(|m| *m == record.author);
    let weight = policy.weight_for(record.size());

    for agg in [&mut week, &mut month] {
      if !agg.window.contains(t) {
        continue;
      }
      match member_idx {
        Some(idx) => agg.credit(idx, record, weight),
        None => agg.other_activity += 1,
      }
    }
  }

  Aggregation { week: week.finish(), month: month.finish(), skipped, filtered_by_state }
}
