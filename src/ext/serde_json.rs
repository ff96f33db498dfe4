// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dotted-path access into hosting-API JSON with typed and lenient extraction
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper (typed, count and text coercions)
// invariants: No panics; missing paths yield None; counts accept numbers or all-digit strings only
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A location inside a JSON document, extracted in a second step.
pub struct JsonFetched<'a> {
  inner: Option<&'a Value>,
}

impl<'a> JsonFetched<'a> {
  pub fn value(&self) -> Option<&'a Value> {
    self.inner.filter(|v| !v.is_null())
  }

  /// Attempt to deserialize the fetched value as `T`.
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self.value().and_then(|v| serde_json::from_value::<T>(v.clone()).ok())
  }

  /// Deserialize as `T`, returning `T::default()` on failure.
  pub fn to_or_default<T>(&self) -> T
  where
    T: DeserializeOwned + Default,
  {
    self.to::<T>().unwrap_or_default()
  }

  /// Non-negative integer from a number or a numeric string. GitLab reports
  /// capped values such as "1000+", which are not counts.
  pub fn to_count(&self) -> Option<u64> {
    match self.value()? {
      Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
      Value::String(s) => {
        let s = s.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
          return None;
        }
        s.parse().ok()
      }
      _ => None,
    }
  }

  /// Strings as-is, numbers rendered; used for ids that vary in type.
  pub fn to_text(&self) -> Option<String> {
    match self.value()? {
      Value::String(s) => Some(s.clone()),
      Value::Number(n) => Some(n.to_string()),
      _ => None,
    }
  }
}

/// Fetch nested values via dotted paths like "author.username".
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;

  /// First path that yields a count.
  fn first_count(&self, paths: &[&str]) -> Option<u64> {
    paths.iter().find_map(|p| self.fetch(p).to_count())
  }
}

impl JsonFetch for Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self) };
    }

    let mut cur = self;

    for key in path.split('.') {
      match cur.get(key) {
        Some(next) => cur = next,
        None => return JsonFetched { inner: None },
      }
    }

    JsonFetched { inner: Some(cur) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn fetch_nested_and_missing() {
    let v = json!({ "author": { "username": "alice" }, "merged_at": null });

    assert_eq!(v.fetch("author.username").to::<String>().as_deref(), Some("alice"));
    assert_eq!(v.fetch("author.name").to::<String>(), None);
    assert_eq!(v.fetch("merged_at").to::<String>(), None);
    assert!(v.fetch("merged_at").value().is_none());
    let s: String = v.fetch("nope").to_or_default();
    assert_eq!(s, "");
  }

  #[test]
  fn counts_accept_numbers_and_digit_strings() {
    let v = json!({ "a": 12, "b": "34", "c": "1000+", "d": -3, "e": 5.0, "f": 2.5, "g": "" });

    assert_eq!(v.fetch("a").to_count(), Some(12));
    assert_eq!(v.fetch("b").to_count(), Some(34));
    assert_eq!(v.fetch("c").to_count(), None);
    assert_eq!(v.fetch("d").to_count(), None);
    assert_eq!(v.fetch("e").to_count(), Some(5));
    assert_eq!(v.fetch("f").to_count(), None);
    assert_eq!(v.fetch("g").to_count(), None);
    assert_eq!(v.first_count(&["c", "missing", "b"]), Some(34));
  }

  #[test]
  fn text_renders_numbers() {
    let v = json!({ "iid": 42, "sha": "abc" });
    assert_eq!(v.fetch("iid").to_text().as_deref(), Some("42"));
    assert_eq!(v.fetch("sha").to_text().as_deref(), Some("abc"));
  }
}
