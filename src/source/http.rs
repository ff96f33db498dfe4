// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Shared blocking HTTP helpers (agent with timeout, JSON GET/POST) for hosting APIs and the Teams webhook
// role: source/http
// side_effects: Network calls
// errors: Non-2xx statuses and transport failures become anyhow errors naming the URL
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

pub const USER_AGENT: &str = concat!("merge-champ/", env!("CARGO_PKG_VERSION"));

pub fn agent(timeout: Duration) -> ureq::Agent {
  ureq::Agent::config_builder().timeout_global(Some(timeout)).build().into()
}

/// GET `url` with extra headers and query pairs, decoding a JSON body.
pub fn get_json(agent: &ureq::Agent, url: &str, headers: &[(&str, &str)], query: &[(&str, String)]) -> Result<Value> {
  let mut req = agent.get(url).header("User-Agent", USER_AGENT);
  if !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("accept")) {
    req = req.header("Accept", "application/json");
  }

  for (k, v) in headers {
    req = req.header(*k, *v);
  }
  for (k, v) in query {
    req = req.query(*k, v.as_str());
  }

  let mut resp = req.call().with_context(|| format!("GET {url}"))?;

  resp.body_mut().read_json::<Value>().with_context(|| format!("decoding JSON from {url}"))
}

/// POST `body` as JSON; only the status matters to callers.
pub fn post_json<T: Serialize>(agent: &ureq::Agent, url: &str, body: &T) -> Result<u16> {
  let resp = agent
    .post(url)
    .header("User-Agent", USER_AGENT)
    .send_json(body)
    .with_context(|| format!("POST {}", redact_url(url)))?;

  Ok(resp.status().as_u16())
}

/// Strip the query string; webhook URLs carry secrets there.
pub fn redact_url(url: &str) -> &str {
  url.split('?').next().unwrap_or(url)
}
