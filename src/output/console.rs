// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Terminal rendering of a Report (two-column combined view or monthly-only view)
// role: output/console
// inputs: Report, ViewMode, colour flag
// outputs: Text on stdout
// invariants:
// - Padding is computed on plain text; colour is applied to whole lines afterwards
// - Combined rows are exactly 79 chars (39 + divider + 39)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use colored::{ColoredString, Colorize};

use crate::model::{CountMode, RankedRow, StateFilter, TimestampBasis};
use crate::output::{OutputChannel, ViewMode};
use crate::report::{Report, WindowReport};
use crate::util::{center, format_count, friendly_username, ljust, truncate_chars};

const COLUMN_WIDTH: usize = 39;
const TOTAL_WIDTH: usize = COLUMN_WIDTH * 2 + 1;
const TITLE: &str = "🎉 MERGE CHAMP RESULTS 🎉";
const SAMPLE_NOTICE: &str = "📊 Using sample data for demonstration...";
const BREAKDOWN: &str = "👥 TEAM BREAKDOWN";

pub struct ConsoleOutput {
  view: ViewMode,
  color: bool,
}

impl ConsoleOutput {
  pub fn new(view: ViewMode, color: bool) -> Self {
    Self { view, color }
  }

  fn paint(&self, line: String, style: fn(&str) -> ColoredString) -> String {
    if self.color {
      style(&line).to_string()
    } else {
      line
    }
  }

  pub fn render(&self, report: &Report) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("\n{}", self.paint("=".repeat(TOTAL_WIDTH), |s| s.bold())));
    lines.push(self.paint(center(TITLE, TOTAL_WIDTH), |s| s.bold().yellow()));
    lines.push(self.paint("=".repeat(TOTAL_WIDTH), |s| s.bold()));
    if report.sample {
      lines.push(self.paint(center(SAMPLE_NOTICE, TOTAL_WIDTH), |s| s.dimmed()));
    }

    match self.view {
      ViewMode::Combined => self.combined(report, &mut lines),
      ViewMode::MonthlyOnly => self.monthly_only(report, &mut lines),
    }

    if !report.warnings.is_empty() {
      lines.push(self.paint(format!("\n⚠️  Skipped {} record(s):", report.skipped_records), |s| s.yellow()));
      for w in &report.warnings {
        lines.push(format!("  - {w}"));
      }
    }

    lines.push(format!("\n💬 {}", self.paint(report.message.clone(), |s| s.green().bold())));
    lines.extend(footer(report));

    lines.join("\n")
  }

  fn combined(&self, report: &Report, lines: &mut Vec<String>) {
    let mode = report.count_mode;
    let (week, month) = (&report.week, &report.month);
    let divider = |middle: &str| format!("{}{middle}{}", "─".repeat(COLUMN_WIDTH + 1), "─".repeat(COLUMN_WIDTH));

    lines.push(self.paint(centered_pair(&week.label, &month.label), |s| s.cyan().bold()));
    lines.push(divider("┼"));
    lines.push(centered_pair(&total_line(week, mode), &total_line(month, mode)));
    if week.summary.other_activity > 0 || month.summary.other_activity > 0 {
      lines.push(centered_pair(&other_line(week), &other_line(month)));
    }
    lines.push(centered_pair(&participation_line(week), &participation_line(month)));
    lines.push(self.paint(centered_pair(&top_line(week, 30), &top_line(month, 30)), |s| s.yellow()));
    lines.push(divider("┼"));
    lines.push(self.paint(centered_pair(BREAKDOWN, BREAKDOWN), |s| s.bold()));
    lines.push(divider("┼"));

    let height = week.rows.len().max(month.rows.len());
    for idx in 0..height {
      let left = week.rows.get(idx).map(|r| row_text(r, mode, Some(28))).unwrap_or_default();
      let right = month.rows.get(idx).map(|r| row_text(r, mode, Some(28))).unwrap_or_default();
      lines.push(format!(
        "{}│{}",
        ljust(&truncate_chars(&left, COLUMN_WIDTH), COLUMN_WIDTH),
        ljust(&truncate_chars(&format!(" {right}"), COLUMN_WIDTH), COLUMN_WIDTH)
      ));
    }

    lines.push(divider("┴"));
  }

  fn monthly_only(&self, report: &Report, lines: &mut Vec<String>) {
    let mode = report.count_mode;
    let month = &report.month;
    let divider = "─".repeat(TOTAL_WIDTH);

    lines.push(self.paint(center(&month.label, TOTAL_WIDTH), |s| s.cyan().bold()));
    lines.push(divider.clone());
    lines.push(center(&total_line(month, mode), TOTAL_WIDTH));
    if month.summary.other_activity > 0 {
      lines.push(center(&other_line(month), TOTAL_WIDTH));
    }
    lines.push(center(&participation_line(month), TOTAL_WIDTH));
    if month.summary.top_contributor.is_some() {
      lines.push(self.paint(center(&top_line(month, 45), TOTAL_WIDTH), |s| s.yellow()));
    }
    lines.push(divider.clone());
    lines.push(self.paint(center(BREAKDOWN, TOTAL_WIDTH), |s| s.bold()));
    lines.push(divider.clone());

    if month.rows.is_empty() {
      lines.push(center("No merge requests recorded.", TOTAL_WIDTH));
    } else {
      for row in &month.rows {
        lines.push(center(&row_text(row, mode, None), TOTAL_WIDTH));
      }
    }

    lines.push(divider);
  }
}

impl OutputChannel for ConsoleOutput {
  fn name(&self) -> &'static str {
    "console"
  }

  fn deliver(&self, report: &Report) -> Result<()> {
    println!("{}", self.render(report));
    Ok(())
  }
}

fn centered_pair(left: &str, right: &str) -> String {
  format!(
    "{}│{}",
    center(&truncate_chars(left, COLUMN_WIDTH), COLUMN_WIDTH),
    center(&truncate_chars(right, COLUMN_WIDTH), COLUMN_WIDTH)
  )
}

fn total_line(w: &WindowReport, mode: CountMode) -> String {
  match mode {
    CountMode::Raw => format!("📊 Total MRs: {}", w.summary.total_count),
    CountMode::Weighted => {
      format!("📊 Total MRs: {} (weighted {})", w.summary.total_count, format_count(w.summary.total_weighted))
    }
  }
}

fn other_line(w: &WindowReport) -> String {
  format!("🤝 Other activity: {}", w.summary.other_activity)
}

fn participation_line(w: &WindowReport) -> String {
  format!("👥 Participation: {}%", w.summary.participation_rate)
}

fn top_line(w: &WindowReport, max: usize) -> String {
  let top = w.summary.top_contributor.as_deref().map(friendly_username).unwrap_or_else(|| "No data".to_string());
  format!("🏆 {}", truncate_chars(&top, max))
}

fn row_text(row: &RankedRow, mode: CountMode, name_max: Option<usize>) -> String {
  let name = friendly_username(&row.stat.member);
  let name = match name_max {
    Some(max) => truncate_chars(&name, max),
    None => name,
  };
  format!("{}. {} {}: {}", row.rank, row.decoration, name, format_count(row.stat.metric(mode)))
}

fn footer(report: &Report) -> Vec<String> {
  let scope = match report.activity.state_filter {
    StateFilter::Merged => "merged",
    StateFilter::All => "all",
  };
  let basis = match report.activity.timestamp_basis {
    TimestampBasis::Created => "creation",
    TimestampBasis::Merged => "merge",
  };
  vec![
    "\n* These numbers make no judgement on quality. The goal is to".to_string(),
    "  encourage working in small batches and frequent contributions.".to_string(),
    format!("  Counts include {scope} merge requests, placed by their {basis} date."),
  ]
}
