// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Order member stats, assign dense ranks, attach stable per-member decorations
// role: ranking core (pure, no IO)
// invariants:
// - Order is metric descending, then member name ascending
// - Equal metrics share a rank; the next distinct metric gets previous + 1
// - Decorations depend only on the sorted roster, never on rank
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;

use crate::model::{CountMode, MemberStat, RankedRow, Roster};

/// Non-medal emoji, assigned by alphabetical roster position.
pub const DECORATION_PALETTE: &[&str] = &["⭐", "🌟", "✨", "💫", "🌺", "🎸", "🎪", "🎭", "🎲", "🎯", "💪", "🚀", "⚡"];

/// Member → decoration lookup, built once per run.
#[derive(Debug, Clone, Default)]
pub struct Decorations {
  by_member: HashMap<String, &'static str>,
}

impl Decorations {
  pub fn for_roster(roster: &Roster) -> Self {
    let by_member = roster
      .sorted()
      .into_iter()
      .enumerate()
      .map(|(i, m)| (m.to_string(), DECORATION_PALETTE[i % DECORATION_PALETTE.len()]))
      .collect();

    Self { by_member }
  }

  /// Members outside the table get the first palette entry.
  pub fn get(&self, member: &str) -> &'static str {
    self.by_member.get(member).copied().unwrap_or(DECORATION_PALETTE[0])
  }
}

/// Sort and dense-rank `stats` under `mode`.
pub fn rank(stats: &[MemberStat], mode: CountMode, decorations: &Decorations) -> Vec<RankedRow> {
  let mut sorted: Vec<&MemberStat> = stats.iter().collect();
  sorted.sort_by(|a, b| b.metric(mode).total_cmp(&a.metric(mode)).then_with(|| a.member.cmp(&b.member)));

  let mut out: Vec<RankedRow> = Vec::with_capacity(sorted.len());
  let mut prev: Option<f64> = None;
  let mut current = 0u32;

  for stat in sorted {
    let metric = stat.metric(mode);
    if prev != Some(metric) {
      current += 1;
      prev = Some(metric);
    }

    out.push(RankedRow { stat: stat.clone(), rank: current, decoration: decorations.get(&stat.member).to_string() });
  }

  out
}
