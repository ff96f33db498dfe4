// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Pretty JSON rendering of the Report for scripting
// role: output/json
// outputs: One JSON document on stdout
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};

use crate::output::OutputChannel;
use crate::report::Report;

pub struct JsonOutput;

impl JsonOutput {
  pub fn render(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).context("serialising report")
  }
}

impl OutputChannel for JsonOutput {
  fn name(&self) -> &'static str {
    "json"
  }

  fn deliver(&self, report: &Report) -> Result<()> {
    println!("{}", Self::render(report)?);
    Ok(())
  }
}
