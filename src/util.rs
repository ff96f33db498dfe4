// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Display helpers (friendly names, count formatting, char-width-safe padding), effective now, man page rendering
// role: utilities/helpers
// inputs: Usernames, metric values, clap CommandFactory
// outputs: Strings for renderers; troff man page text
// invariants:
// - Padding and truncation count chars, never split UTF-8
// - format_count prints whole numbers without decimals
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use clap::CommandFactory;

/// "john.doe" / "jane_smith" → "John Doe" / "Jane Smith".
pub fn friendly_username(username: &str) -> String {
  username
    .replace(['.', '_'], " ")
    .split_whitespace()
    .map(|word| {
      let mut chars = word.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect::<String>(),
        None => String::new(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

/// Whole numbers without decimals, otherwise up to two decimals with trailing
/// zeros trimmed.
pub fn format_count(v: f64) -> String {
  if v.fract() == 0.0 {
    return format!("{}", v as i64);
  }

  let s = format!("{v:.2}");
  s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Truncate to at most `max` chars.
pub fn truncate_chars(s: &str, max: usize) -> String {
  s.chars().take(max).collect()
}

/// Left-justify to `width` chars.
pub fn ljust(s: &str, width: usize) -> String {
  let n = s.chars().count();
  if n >= width {
    return s.to_string();
  }
  format!("{s}{}", " ".repeat(width - n))
}

/// Center within `width` chars; the extra space goes right.
pub fn center(s: &str, width: usize) -> String {
  let n = s.chars().count();
  if n >= width {
    return s.to_string();
  }
  let left = (width - n) / 2;
  let right = width - n - left;
  format!("{}{s}{}", " ".repeat(left), " ".repeat(right))
}

/// Returns the effective "now" given an optional override.
///
/// Keeps test determinism in one place instead of sprinkling `Utc::now()`
/// through the pipeline.
pub fn effective_now(override_now: Option<DateTime<Utc>>) -> DateTime<Utc> {
  override_now.unwrap_or_else(Utc::now)
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
