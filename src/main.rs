use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use merge_champ::cli::{normalize, Cli};
use merge_champ::config::Settings;
use merge_champ::{output, pipeline, source, util};

fn init_tracing(verbose: bool) {
  let fallback = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

  tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  init_tracing(cli.verbose);

  // Phase 1: settings and CLI into one immutable config
  let settings = Settings::load(cli.env_file.as_deref())?;
  let cfg = normalize(cli, settings)?;

  // Phase 2: validate everything before any network call
  let now = util::effective_now(cfg.now_override);
  let plan = pipeline::plan(&cfg, now)?;

  // Phase 3: fetch, aggregate, rank
  let records = source::build_source(&plan.spec, &cfg, &plan.roster, &plan.policy);
  let report = pipeline::execute(&plan, records.as_ref(), now)?;

  // Phase 4: deliver
  for channel in output::channels(&cfg) {
    channel.deliver(&report)?;
  }

  Ok(())
}
