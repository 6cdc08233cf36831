//! Check engine evaluating policy `checks` against a parsed entity.
//!
//! Checks other than `required` are skipped when their field is absent, so
//! optional fields only get validated when present.

use crate::models::policy::{Check, Level};
use regex::Regex;
use serde_json::Value as Json;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single failed check.
pub struct Violation {
    pub field: String,
    pub level: Level,
    pub message: String,
}

/// Resolve a dotted field path. `$` or an empty path returns the root.
pub fn lookup<'a>(json: &'a Json, path: &str) -> Option<&'a Json> {
    let path = path.trim_start_matches('$').trim_start_matches('.');
    if path.is_empty() {
        return Some(json);
    }
    path.split('.').try_fold(json, |cur, seg| cur.get(seg))
}

/// JSON kind name of a value, as used by `type` checks.
pub fn kind_of(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn is_kind(v: &Json, expected: &str) -> bool {
    let actual = kind_of(v);
    actual == expected || (expected == "number" && actual == "integer")
}

fn push(
    out: &mut Vec<Violation>,
    field: &str,
    level: Level,
    custom: &Option<String>,
    default_msg: impl FnOnce() -> String,
) {
    out.push(Violation {
        field: field.to_string(),
        level,
        message: custom.clone().unwrap_or_else(default_msg),
    });
}

fn compile(regex: &str, field: &str, level: Level, out: &mut Vec<Violation>) -> Option<Regex> {
    match Regex::new(regex) {
        Ok(re) => Some(re),
        Err(e) => {
            out.push(Violation {
                field: field.to_string(),
                level,
                message: format!("invalid pattern '{}' in policy: {}", regex, e),
            });
            None
        }
    }
}

/// Run all `checks` against `json`, in declaration order.
pub fn run_checks(checks: &[Check], json: &Json) -> Vec<Violation> {
    let mut out = Vec::new();
    for check in checks {
        match check {
            Check::Required {
                fields,
                message,
                level,
            } => {
                for f in fields {
                    if lookup(json, f).is_none() {
                        push(&mut out, f, *level, message, || {
                            format!("missing required field '{}'", f)
                        });
                    }
                }
            }
            Check::Type {
                fields,
                message,
                level,
            } => {
                for (f, expected) in fields {
                    if let Some(v) = lookup(json, f) {
                        if !is_kind(v, expected) {
                            push(&mut out, f, *level, message, || {
                                format!("'{}' must be of type {}, found {}", f, expected, kind_of(v))
                            });
                        }
                    }
                }
            }
            Check::Const {
                field,
                value,
                message,
                level,
            } => {
                if let Some(v) = lookup(json, field) {
                    if v != value {
                        push(&mut out, field, *level, message, || {
                            format!("'{}' must equal {}", field, value)
                        });
                    }
                }
            }
            Check::Pattern {
                field,
                regex,
                message,
                level,
            } => {
                if let Some(Json::String(s)) = lookup(json, field) {
                    if let Some(re) = compile(regex, field, *level, &mut out) {
                        if !re.is_match(s) {
                            push(&mut out, field, *level, message, || {
                                format!("'{}' value \"{}\" does not match {}", field, s, regex)
                            });
                        }
                    }
                }
            }
            Check::Enum {
                field,
                values,
                message,
                level,
            } => {
                if let Some(v) = lookup(json, field) {
                    if !values.contains(v) {
                        push(&mut out, field, *level, message, || {
                            let allowed: Vec<String> = values.iter().map(|x| x.to_string()).collect();
                            format!("'{}' must be one of [{}]", field, allowed.join(", "))
                        });
                    }
                }
            }
            Check::MinLength {
                field,
                min,
                message,
                level,
            } => {
                if let Some(Json::String(s)) = lookup(json, field) {
                    if s.chars().count() < *min {
                        push(&mut out, field, *level, message, || {
                            format!("'{}' must be at least {} characters", field, min)
                        });
                    }
                }
            }
            Check::MaxLength {
                field,
                max,
                message,
                level,
            } => {
                if let Some(Json::String(s)) = lookup(json, field) {
                    if s.chars().count() > *max {
                        push(&mut out, field, *level, message, || {
                            format!("'{}' must be at most {} characters", field, max)
                        });
                    }
                }
            }
            Check::AllowedKeys {
                field,
                keys,
                message,
                level,
            } => {
                if let Some(Json::Object(obj)) = lookup(json, field) {
                    let unknown: Vec<&str> = obj
                        .keys()
                        .filter(|k| !keys.contains(k))
                        .map(String::as_str)
                        .collect();
                    if !unknown.is_empty() {
                        push(&mut out, field, *level, message, || {
                            format!("unknown fields [{}]", unknown.join(", "))
                        });
                    }
                }
            }
            Check::KeyPattern {
                field,
                regex,
                message,
                level,
            } => {
                if let Some(Json::Object(obj)) = lookup(json, field) {
                    if let Some(re) = compile(regex, field, *level, &mut out) {
                        for k in obj.keys().filter(|k| !re.is_match(k)) {
                            push(&mut out, field, *level, message, || {
                                format!("'{}' has invalid key \"{}\"", field, k)
                            });
                        }
                    }
                }
            }
            Check::EachPattern {
                field,
                regex,
                message,
                level,
            } => {
                let items: Vec<&Json> = match lookup(json, field) {
                    Some(Json::Array(arr)) => arr.iter().collect(),
                    Some(Json::Object(obj)) => obj.values().collect(),
                    _ => Vec::new(),
                };
                if items.is_empty() {
                    continue;
                }
                if let Some(re) = compile(regex, field, *level, &mut out) {
                    for s in items.iter().filter_map(|v| v.as_str()) {
                        if !re.is_match(s) {
                            push(&mut out, field, *level, message, || {
                                format!("'{}' has invalid value \"{}\"", field, s)
                            });
                        }
                    }
                }
            }
            Check::ItemType {
                field,
                item,
                message,
                level,
            } => {
                match lookup(json, field) {
                    Some(Json::Array(arr)) => {
                        if let Some((idx, v)) = arr.iter().enumerate().find(|(_, v)| !is_kind(v, item)) {
                            push(&mut out, field, *level, message, || {
                                format!("'{}[{}]' must be of type {}, found {}", field, idx, item, kind_of(v))
                            });
                        }
                    }
                    Some(Json::Object(obj)) => {
                        for (k, v) in obj.iter().filter(|(_, v)| !is_kind(v, item)) {
                            push(&mut out, field, *level, message, || {
                                format!("'{}.{}' must be of type {}, found {}", field, k, item, kind_of(v))
                            });
                        }
                    }
                    _ => {}
                }
            }
            Check::ItemFields {
                field,
                required,
                types,
                message,
                level,
            } => {
                let Some(Json::Array(arr)) = lookup(json, field) else {
                    continue;
                };
                for (idx, obj) in arr.iter().enumerate() {
                    let Json::Object(obj) = obj else {
                        continue;
                    };
                    for key in required.iter().filter(|k| !obj.contains_key(k.as_str())) {
                        push(&mut out, field, *level, message, || {
                            format!("'{}[{}]' is missing required field '{}'", field, idx, key)
                        });
                    }
                    for (key, expected) in types {
                        if let Some(v) = obj.get(key) {
                            if !is_kind(v, expected) {
                                push(&mut out, field, *level, message, || {
                                    format!(
                                        "'{}[{}].{}' must be of type {}, found {}",
                                        field,
                                        idx,
                                        key,
                                        expected,
                                        kind_of(v)
                                    )
                                });
                            }
                        }
                    }
                }
            }
        }
    }
    out
}
