// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Validate an EffectiveConfig into a RunPlan, then fetch, aggregate and build the Report
// role: orchestration
// inputs: EffectiveConfig, effective now, a MergeRequestSource
// outputs: RunPlan (validated, no IO yet) and Report
// invariants:
// - Every ConfigurationError surfaces from plan(), before any network call
// - execute() fetches the union span exactly once
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::aggregate::{aggregate, AggregateOptions};
use crate::cli::EffectiveConfig;
use crate::error::ConfigurationError;
use crate::model::{ActivityPolicy, Roster};
use crate::rank::Decorations;
use crate::report::{build_report, Report};
use crate::source::{resolve_spec, MergeRequestSource, SourceSpec};
use crate::weight::WeightPolicy;
use crate::window::{resolve_windows, ResolvedWindows};

pub const SAMPLE_TEAM: &str = "john.doe,jane.smith,alice.johnson,bob.wilson";

/// Everything a run needs, validated up front.
#[derive(Debug, Clone)]
pub struct RunPlan {
  pub roster: Roster,
  pub policy: WeightPolicy,
  pub windows: ResolvedWindows,
  pub options: AggregateOptions,
  pub decorations: Decorations,
  pub spec: SourceSpec,
  pub sample: bool,
}

fn resolve_roster(cfg: &EffectiveConfig) -> Result<Roster, ConfigurationError> {
  match cfg.settings.team_members.as_deref() {
    Some(list) => Roster::parse(list),
    None if cfg.sample => {
      warn!("TEAM_MEMBERS is not set; using the example team for sample data");
      Roster::parse(SAMPLE_TEAM)
    }
    None => Err(ConfigurationError::EmptyRoster),
  }
}

pub fn plan(cfg: &EffectiveConfig, now: DateTime<Utc>) -> Result<RunPlan, ConfigurationError> {
  let roster = resolve_roster(cfg)?;
  let policy = WeightPolicy::parse(cfg.settings.weight_rules.as_deref().unwrap_or(""))?;
  let activity = ActivityPolicy::new(cfg.state_filter, cfg.timestamp_basis)?;
  let windows = resolve_windows(&cfg.selector, cfg.zone.date_of(now), cfg.zone)?;

  if cfg.send_teams && !cfg.teams_debug && cfg.settings.teams_webhook_url.is_none() {
    return Err(ConfigurationError::MissingWebhook);
  }

  let spec = resolve_spec(cfg)?;

  Ok(RunPlan {
    decorations: Decorations::for_roster(&roster),
    roster,
    policy,
    windows,
    options: AggregateOptions { count_mode: cfg.count_mode, activity },
    sample: spec == SourceSpec::Sample,
    spec,
  })
}

pub fn execute(plan: &RunPlan, source: &dyn MergeRequestSource, now: DateTime<Utc>) -> Result<Report> {
  let span = plan.windows.fetch_span();
  let records = source
    .fetch_merge_requests(&span)
    .with_context(|| format!("fetching merge requests from {} for {}", source.name(), span.label))?;
  info!("fetched {} merge requests from {}", records.len(), source.name());

  let aggregation = aggregate(&plan.roster, &records, &plan.windows, &plan.policy, plan.options);
  for skipped in &aggregation.skipped {
    warn!("skipped record: {}", skipped);
  }

  let report = build_report(aggregation, &plan.decorations, plan.options.activity, now, plan.sample);
  info!(
    week_total = report.week.summary.total_count,
    month_total = report.month.summary.total_count,
    count_mode = %report.count_mode,
    "report ready"
  );

  Ok(report)
}
