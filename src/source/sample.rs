// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Deterministic synthetic merge requests for demos and offline runs
// role: source/sample
// inputs: Roster and fetch span
// outputs: MergeRequestRecord list; identical for identical inputs
// invariants: No randomness, no IO; weekends stay quiet
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveTime, SecondsFormat, Weekday};

use crate::model::{MergeRequestRecord, MrState, Roster};
use crate::source::MergeRequestSource;
use crate::window::TimeWindow;

const SIZE_TABLE: [u64; 6] = [8, 35, 120, 260, 15, 60];
pub const EXTERNAL_AUTHOR: &str = "external.contributor";

pub struct SampleSource {
  members: Vec<String>,
}

impl SampleSource {
  pub fn new(roster: &Roster) -> Self {
    Self { members: roster.sorted().into_iter().map(str::to_string).collect() }
  }
}

impl MergeRequestSource for SampleSource {
  fn name(&self) -> &'static str {
    "sample"
  }

  fn fetch_merge_requests(&self, span: &TimeWindow) -> Result<Vec<MergeRequestRecord>> {
    let mut out: Vec<MergeRequestRecord> = Vec::new();
    let mut emitted = 0u64;
    let mut day = span.start.date_naive();
    let last = span.end.date_naive();

    while day <= last {
      if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        day += Duration::days(1);
        continue;
      }
      let ordinal = u64::try_from(day.num_days_from_ce()).unwrap_or(0);

      let authors = self.members.iter().map(String::as_str).chain((ordinal % 3 == 0).then_some(EXTERNAL_AUTHOR));
      for (j, author) in authors.enumerate() {
        let seed = ordinal * 31 + j as u64 * 17;
        if seed % 5 >= 2 {
          continue;
        }

        let hour = 9 + (j as u32 % 8);
        let created = day.and_time(NaiveTime::from_hms_opt(hour, 15, 0).unwrap_or(NaiveTime::MIN)).and_utc();
        if !span.contains(created) {
          continue;
        }

        let open = emitted % 7 == 6;
        emitted += 1;

        out.push(MergeRequestRecord {
          id: format!("!{}", 1000 + emitted),
          author: author.to_string(),
          title: format!("Sample change {emitted}"),
          state: if open { MrState::Open } else { MrState::Merged },
          created_at: Some(created.to_rfc3339_opts(SecondsFormat::Secs, true)),
          merged_at: (!open).then(|| (created + Duration::hours(3)).to_rfc3339_opts(SecondsFormat::Secs, true)),
          change_size: Some(SIZE_TABLE[((seed / 5) % SIZE_TABLE.len() as u64) as usize]),
          web_url: Some(format!("https://gitlab.example.com/sample/-/merge_requests/{}", 1000 + emitted)),
        });
      }

      day += Duration::days(1);
    }

    Ok(out)
  }
}
