// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Output channel trait and channel selection (console text, JSON, Teams webhook)
// role: output/selection
// inputs: Report (read-only), EffectiveConfig
// outputs: Rendered text on stdout or an HTTP POST
// invariants: Channels never mutate the report; stdout carries only rendered output
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod console;
pub mod json;
pub mod teams;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use crate::cli::EffectiveConfig;
use crate::report::Report;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum ViewMode {
  #[default]
  Combined,
  MonthlyOnly,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

/// A destination for a finished report.
pub trait OutputChannel {
  fn name(&self) -> &'static str;

  fn deliver(&self, report: &Report) -> Result<()>;
}

/// Stdout channel per `--format`, then Teams when requested.
pub fn channels(cfg: &EffectiveConfig) -> Vec<Box<dyn OutputChannel>> {
  let mut out: Vec<Box<dyn OutputChannel>> = Vec::new();

  match cfg.format {
    OutputFormat::Text => out.push(Box::new(console::ConsoleOutput::new(cfg.view, cfg.color))),
    OutputFormat::Json => out.push(Box::new(json::JsonOutput)),
  }

  if cfg.send_teams {
    out.push(Box::new(
      teams::TeamsOutput::new(cfg.settings.teams_webhook_url.clone(), cfg.settings.teams_timeout, cfg.teams_debug)
        .with_view(cfg.view),
    ));
  }

  out
}
