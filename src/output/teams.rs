// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Microsoft Teams delivery (markdown text plus an Adaptive Card 1.4 attachment) via incoming webhook
// role: output/teams
// inputs: Report, ViewMode, webhook URL, timeout, debug flag
// outputs: HTTP POST to the webhook, or the request body on stdout in debug mode
// side_effects: Network call unless debug mode is on
// errors: Missing webhook or a failed POST end the run with an error
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::info;

use crate::error::ConfigurationError;
use crate::model::{CountMode, RankedRow};
use crate::output::{OutputChannel, ViewMode};
use crate::report::{Report, WindowReport};
use crate::source::http;
use crate::util::{format_count, friendly_username};

const CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";
const CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";

pub struct TeamsOutput {
  webhook_url: Option<String>,
  timeout: Duration,
  debug: bool,
  view: ViewMode,
}

impl TeamsOutput {
  pub fn new(webhook_url: Option<String>, timeout: Duration, debug: bool) -> Self {
    Self { webhook_url, timeout, debug, view: ViewMode::Combined }
  }

  pub fn with_view(mut self, view: ViewMode) -> Self {
    self.view = view;
    self
  }

  fn windows<'a>(&self, report: &'a Report) -> Vec<&'a WindowReport> {
    match self.view {
      ViewMode::Combined => vec![&report.week, &report.month],
      ViewMode::MonthlyOnly => vec![&report.month],
    }
  }

  /// Plain-text fallback shown by clients that do not render cards.
  pub fn markdown(&self, report: &Report) -> String {
    let mode = report.count_mode;
    let mut lines: Vec<String> = vec!["🎉 **Merge Champ Results** 🎉".into(), String::new()];

    if report.sample {
      lines.push("_Sample data mode_".into());
      lines.push(String::new());
    }

    for w in self.windows(report) {
      lines.push(format!("**{}**", w.label));
      lines.push(format!("- {}", total_text(w, mode)));
      if w.summary.other_activity > 0 {
        lines.push(format!("- Other activity: {}", w.summary.other_activity));
      }
      lines.push(format!("- Participation: {}%", w.summary.participation_rate));
      if let Some(top) = top_text(w, mode) {
        lines.push(format!("- Top Contributor: {top}"));
      }
      lines.push("- Team breakdown:".into());
      if w.rows.is_empty() {
        lines.push("  - No merge requests recorded.".into());
      }
      for row in &w.rows {
        lines.push(format!("  {}", row_text(row, mode)));
      }
      lines.push(String::new());
    }

    lines.push(format!("💬 {}", report.message));
    lines.join("\n")
  }

  pub fn card(&self, report: &Report) -> Value {
    let mode = report.count_mode;
    let mut body: Vec<Value> = vec![json!({
      "type": "TextBlock",
      "text": "🎉 Merge Champ Results 🎉",
      "weight": "Bolder",
      "size": "Large",
      "wrap": true,
    })];

    if report.sample {
      body.push(json!({
        "type": "TextBlock",
        "text": "📊 Using sample data for demonstration",
        "wrap": true,
        "isSubtle": true,
      }));
    }

    for w in self.windows(report) {
      body.push(window_container(w, mode));
    }

    body.push(json!({
      "type": "TextBlock",
      "text": format!("💬 {}", report.message),
      "wrap": true,
      "separator": true,
    }));

    json!({
      "contentType": CARD_CONTENT_TYPE,
      "content": {
        "$schema": CARD_SCHEMA,
        "type": "AdaptiveCard",
        "version": "1.4",
        "body": body,
        "msteams": { "width": "Full" },
      },
    })
  }

  pub fn request_body(&self, report: &Report) -> Value {
    json!({
      "text": self.markdown(report),
      "type": "message",
      "attachments": [self.card(report)],
    })
  }
}

impl OutputChannel for TeamsOutput {
  fn name(&self) -> &'static str {
    "teams"
  }

  fn deliver(&self, report: &Report) -> Result<()> {
    let body = self.request_body(report);

    if self.debug {
      println!("\n🔍 Teams publish debug mode: request body");
      println!("{}", serde_json::to_string_pretty(&body).context("serialising Teams request body")?);
      info!("Teams debug mode active; skipping HTTP POST");
      return Ok(());
    }

    let url = self.webhook_url.as_deref().ok_or(ConfigurationError::MissingWebhook)?;
    let agent = http::agent(self.timeout);
    let status = http::post_json(&agent, url, &body).context("posting summary to Microsoft Teams")?;
    info!("delivered merge summary to Microsoft Teams (HTTP {})", status);

    Ok(())
  }
}

fn total_text(w: &WindowReport, mode: CountMode) -> String {
  match mode {
    CountMode::Raw => format!("Total MRs: {}", w.summary.total_count),
    CountMode::Weighted => {
      format!("Total MRs: {} (weighted {})", w.summary.total_count, format_count(w.summary.total_weighted))
    }
  }
}

fn top_text(w: &WindowReport, mode: CountMode) -> Option<String> {
  let top = w.summary.top_contributor.as_deref()?;
  let unit = match mode {
    CountMode::Raw => "MRs",
    CountMode::Weighted => "weighted",
  };
  Some(format!("{} ({} {unit})", friendly_username(top), format_count(w.summary.top_metric)))
}

fn row_text(row: &RankedRow, mode: CountMode) -> String {
  format!(
    "{}. {} {}: {}",
    row.rank,
    row.decoration,
    friendly_username(&row.stat.member),
    format_count(row.stat.metric(mode))
  )
}

fn breakdown_row(row: &RankedRow, mode: CountMode) -> Value {
  json!({
    "type": "ColumnSet",
    "spacing": "Small",
    "columns": [
      {
        "type": "Column",
        "width": "stretch",
        "items": [{
          "type": "TextBlock",
          "text": format!("{}. {} {}", row.rank, row.decoration, friendly_username(&row.stat.member)),
          "wrap": true,
          "maxLines": 1,
        }],
      },
      {
        "type": "Column",
        "width": "auto",
        "items": [{
          "type": "TextBlock",
          "text": format_count(row.stat.metric(mode)),
          "wrap": false,
          "horizontalAlignment": "Right",
        }],
      },
    ],
  })
}

fn window_container(w: &WindowReport, mode: CountMode) -> Value {
  let mut items: Vec<Value> = vec![
    json!({ "type": "TextBlock", "text": w.label, "weight": "Bolder", "wrap": true }),
    json!({
      "type": "ColumnSet",
      "columns": [
        {
          "type": "Column",
          "width": "stretch",
          "items": [{ "type": "TextBlock", "text": format!("📊 {}", total_text(w, mode)), "wrap": true, "maxLines": 1 }],
        },
        {
          "type": "Column",
          "width": "auto",
          "items": [{
            "type": "TextBlock",
            "text": format!("👥 Participation: {}%", w.summary.participation_rate),
            "wrap": false,
            "horizontalAlignment": "Right",
            "maxLines": 1,
          }],
        },
      ],
    }),
  ];

  if let Some(top) = top_text(w, mode) {
    items.push(json!({ "type": "TextBlock", "text": format!("🏆 Top Contributor: {top}"), "wrap": true }));
  }

  if w.rows.is_empty() {
    items.push(json!({ "type": "TextBlock", "text": "No merge requests recorded.", "wrap": true, "isSubtle": true }));
  } else {
    items.extend(w.rows.iter().map(|r| breakdown_row(r, mode)));
  }

  json!({ "type": "Container", "items": items, "spacing": "Medium", "style": "emphasis" })
}
