//! Message templates rendered against a response body.
//!
//! `${path}` resolves a dotted path in the body (`${user.name}`, `${0.id}` for
//! the first array element), `${#path}` is the length of the array, object or
//! string at `path` (`${#}` for the body itself), and `${path|fallback}` is used
//! when the value is missing or null. Missing values without a fallback render
//! as `None`, lengths of missing values as `0`.

use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::OnceLock;

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$\{(#?)([A-Za-z0-9_.\-]*)(?:\|([^}]*))?\}")
            .expect("placeholder pattern is valid")
    })
}

/// Look up a dotted path; an empty path is the value itself
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    let pointer = format!("/{}", path.replace('.', "/"));
    value.pointer(&pointer).filter(|v| !v.is_null())
}

/// Render `template` against `body`
pub fn render(template: &str, body: &Value) -> String {
    placeholder()
        .replace_all(template, |caps: &Captures| {
            let is_len = !caps[1].is_empty();
            let path = &caps[2];
            let fallback = caps.get(3).map(|m| m.as_str());

            match (lookup(body, path), fallback) {
                (Some(value), _) if is_len => length_of(value).to_string(),
                (Some(value), _) => display(value),
                (None, Some(fallback)) => fallback.to_string(),
                (None, None) if is_len => "0".to_string(),
                (None, None) => "None".to_string(),
            }
        })
        .to_string()
}

fn length_of(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        Value::String(s) => s.chars().count(),
        _ => 0,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
