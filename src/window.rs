// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Resolve the weekly and monthly reporting windows from a reference date, selectors and a time zone
// role: time windows
// inputs: Reference date (today or --now-override), --week/--week-offset, --month/--month-offset, zone
// outputs: Half-open [start, end) UTC instants with human labels
// invariants:
// - Week windows run Monday 00:00 to the following Monday 00:00 in the configured zone
// - Month windows run from the first of the month to the first of the next month
// - Explicit selectors beat offsets; negative offsets are rejected
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Local, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use crate::error::ConfigurationError;

/// Zone used to turn calendar boundaries into instants.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum Zone {
  #[default]
  Local,
  Utc,
  Named(chrono_tz::Tz),
}

impl FromStr for Zone {
  type Err = ConfigurationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    match trimmed.to_ascii_lowercase().as_str() {
      "" | "local" => Ok(Zone::Local),
      "utc" | "z" => Ok(Zone::Utc),
      _ => trimmed
        .parse::<chrono_tz::Tz>()
        .map(Zone::Named)
        .map_err(|_| ConfigurationError::InvalidZone(s.to_string())),
    }
  }
}

impl fmt::Display for Zone {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Zone::Local => f.write_str("local"),
      Zone::Utc => f.write_str("utc"),
      Zone::Named(tz) => f.write_str(tz.name()),
    }
  }
}

fn localize<Z: TimeZone>(tz: &Z, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
  tz.from_local_datetime(naive).earliest().map(|dt| dt.with_timezone(&Utc))
}

impl Zone {
  /// Interpret a wall-clock time in this zone. `None` when the time falls in a
  /// DST gap.
  pub fn to_utc(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
    match self {
      Zone::Local => localize(&Local, naive),
      Zone::Utc => Some(naive.and_utc()),
      Zone::Named(tz) => localize(tz, naive),
    }
  }

  /// Calendar date of `instant` as seen in this zone.
  pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
    match self {
      Zone::Local => instant.with_timezone(&Local).date_naive(),
      Zone::Utc => instant.date_naive(),
      Zone::Named(tz) => instant.with_timezone(tz).date_naive(),
    }
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
  Week,
  Month,
  /// Covering span of several windows, used only for fetching.
  Span,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeWindow {
  pub label: String,
  pub kind: WindowKind,
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
}

impl TimeWindow {
  /// Half-open membership: `start <= t < end`.
  pub fn contains(&self, t: DateTime<Utc>) -> bool {
    self.start <= t && t < self.end
  }

  pub fn union(&self, other: &TimeWindow) -> TimeWindow {
    TimeWindow {
      label: format!("{} + {}", self.label, other.label),
      kind: WindowKind::Span,
      start: self.start.min(other.start),
      end: self.end.max(other.end),
    }
  }
}

/// User-facing window selectors, before validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowSelector {
  pub week: Option<String>,
  pub week_offset: i64,
  pub month: Option<String>,
  pub month_offset: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedWindows {
  pub week: TimeWindow,
  pub month: TimeWindow,
}

impl ResolvedWindows {
  /// The span a record source must cover so both windows are complete.
  pub fn fetch_span(&self) -> TimeWindow {
    self.week.union(&self.month)
  }
}

/// Parse `YYYY-MM` into `(year, month)`.
pub fn parse_year_month(year_month: &str) -> Result<(i32, u32), ConfigurationError> {
  let invalid = || ConfigurationError::InvalidMonth(year_month.to_string());
  let (y, m) = year_month.trim().split_once('-').ok_or_else(invalid)?;

  if y.len() != 4 || m.len() != 2 {
    return Err(invalid());
  }
  let y: i32 = y.parse().map_err(|_| invalid())?;
  let m: u32 = m.parse().map_err(|_| invalid())?;

  if !(1..=12).contains(&m) {
    return Err(invalid());
  }

  Ok((y, m))
}

/// Monday of the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
  date - chrono::Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Naive `[first of month, first of next month)` bounds.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
  let first = NaiveDate::from_ymd_opt(year, month, 1)?;
  let next = first.checked_add_months(Months::new(1))?;
  Some((first, next))
}

fn offset_u32(name: &'static str, value: i64) -> Result<u32, ConfigurationError> {
  if value < 0 {
    return Err(ConfigurationError::NegativeOffset { name, value });
  }
  u32::try_from(value).map_err(|_| ConfigurationError::UnrepresentableInstant(format!("{name} {value}")))
}

fn instant(zone: Zone, date: NaiveDate) -> Result<DateTime<Utc>, ConfigurationError> {
  zone
    .to_utc(&date.and_time(chrono::NaiveTime::MIN))
    .ok_or_else(|| ConfigurationError::UnrepresentableInstant(format!("{date} 00:00")))
}

fn week_window(monday: NaiveDate, zone: Zone) -> Result<TimeWindow, ConfigurationError> {
  let next = monday
    .checked_add_days(Days::new(7))
    .ok_or_else(|| ConfigurationError::UnrepresentableInstant(format!("week of {monday}")))?;
  let sunday = next.pred_opt().unwrap_or(monday);

  Ok(TimeWindow {
    label: format!("{} - {}", monday.format("%b %d"), sunday.format("%b %d, %Y")),
    kind: WindowKind::Week,
    start: instant(zone, monday)?,
    end: instant(zone, next)?,
  })
}

fn month_window(first: NaiveDate, next: NaiveDate, zone: Zone) -> Result<TimeWindow, ConfigurationError> {
  Ok(TimeWindow {
    label: first.format("%B %Y").to_string(),
    kind: WindowKind::Month,
    start: instant(zone, first)?,
    end: instant(zone, next)?,
  })
}

/// Resolve both windows for `reference` (a calendar date in `zone`).
pub fn resolve_windows(
  selector: &WindowSelector,
  reference: NaiveDate,
  zone: Zone,
) -> Result<ResolvedWindows, ConfigurationError> {
  // Offsets are validated even when an explicit selector makes them moot.
  let week_back = offset_u32("week offset", selector.week_offset)?;
  let month_back = offset_u32("month offset", selector.month_offset)?;

  let monday = match selector.week.as_deref() {
    Some(raw) => {
      let day = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ConfigurationError::InvalidWeek(raw.to_string()))?;
      start_of_week(day)
    }
    None => start_of_week(reference)
      .checked_sub_days(Days::new(u64::from(week_back) * 7))
      .ok_or_else(|| ConfigurationError::UnrepresentableInstant(format!("{week_back} weeks back")))?,
  };

  let (first, next) = match selector.month.as_deref() {
    Some(raw) => {
      let (y, m) = parse_year_month(raw)?;
      month_bounds(y, m).ok_or_else(|| ConfigurationError::InvalidMonth(raw.to_string()))?
    }
    None => {
      let this_month = reference.with_day(1).unwrap_or(reference);
      let first = this_month
        .checked_sub_months(Months::new(month_back))
        .ok_or_else(|| ConfigurationError::UnrepresentableInstant(format!("{month_back} months back")))?;
      month_bounds(first.year(), first.month())
        .ok_or_else(|| ConfigurationError::UnrepresentableInstant(first.to_string()))?
    }
  };

  Ok(ResolvedWindows { week: week_window(monday, zone)?, month: month_window(first, next, zone)? })
}

/// Parse a `--now-override` string.
/// Accepts RFC3339 (e.g. 2025-08-15T12:00:00Z) or a naive timestamp formatted
/// as `%Y-%m-%dT%H:%M:%S`, read in `zone`.
pub fn parse_now_override(raw: &str, zone: Zone) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(raw.trim())
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
    .or_else(|| {
      NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S")
        .ok()
        .and_then(|ndt| zone.to_utc(&ndt))
    })
}

/// Parse a record timestamp. RFC3339 first; a naive timestamp is read as UTC.
pub fn parse_record_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  DateTime::parse_from_rfc3339(raw)
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
    .or_else(|| {
      NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ndt| ndt.and_utc())
    })
}
