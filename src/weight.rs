// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Map a merge request's change size (lines) to a weight using threshold rules
// role: weighting policy
// inputs: MR_WEIGHT_RULES text such as "20:0.3,80:0.6,200:1.0"
// outputs: WeightPolicy with strictly increasing thresholds and non-decreasing weights
// invariants:
// - weight_for is total over u64 and non-decreasing in size
// - No rules means every merge request weighs 1.0
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightRule {
  pub threshold: u64,
  pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WeightPolicy {
  rules: Vec<WeightRule>,
}

fn parse_entry(entry: &str) -> Result<WeightRule, ConfigurationError> {
  let invalid = |reason: &str| ConfigurationError::InvalidWeightRule { entry: entry.to_string(), reason: reason.to_string() };

  let (threshold, weight) = entry.split_once(':').ok_or_else(|| invalid("expected threshold:weight"))?;
  let threshold = threshold.trim();
  let weight = weight.trim();

  if threshold.starts_with('-') {
    return Err(invalid("threshold must not be negative"));
  }
  let threshold: u64 = threshold.parse().map_err(|_| invalid("threshold is not a whole number"))?;
  let weight: f64 = weight.parse().map_err(|_| invalid("weight is not a number"))?;

  if !weight.is_finite() {
    return Err(invalid("weight must be finite"));
  }
  if weight < 0.0 {
    return Err(invalid("weight must not be negative"));
  }

  Ok(WeightRule { threshold, weight })
}

impl WeightPolicy {
  /// Build a policy from rules in any order.
  pub fn from_rules(mut rules: Vec<WeightRule>) -> Result<Self, ConfigurationError> {
    rules.sort_by_key(|r| r.threshold);

    for pair in rules.windows(2) {
      if pair[0].threshold == pair[1].threshold {
        return Err(ConfigurationError::DuplicateThreshold(pair[1].threshold));
      }
      if pair[1].weight < pair[0].weight {
        return Err(ConfigurationError::DecreasingWeight { threshold: pair[1].threshold, weight: pair[1].weight });
      }
    }

    Ok(Self { rules })
  }

  /// Parse `threshold:weight,...`. Blank entries are ignored.
  pub fn parse(text: &str) -> Result<Self, ConfigurationError> {
    let rules = text
      .split(',')
      .map(str::trim)
      .filter(|e| !e.is_empty())
      .map(parse_entry)
      .collect::<Result<Vec<_>, _>>()?;

    Self::from_rules(rules)
  }

  pub fn rules(&self) -> &[WeightRule] {
    &self.rules
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  /// Weight of the greatest threshold `<= size`. Sizes below the smallest
  /// threshold take the smallest rule's weight.
  pub fn weight_for(&self, size: u64) -> f64 {
    let Some(first) = self.rules.first() else {
      return 1.0;
    };

    match self.rules.partition_point(|r| r.threshold <= size) {
      0 => first.weight,
      n => self.rules[n - 1].weight,
    }
  }
}

impl FromStr for WeightPolicy {
  type Err = ConfigurationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}
