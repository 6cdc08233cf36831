//! Policy schema used by the entity and kind validators.
//!
//! Policies are TOML documents embedded in the binary (`policies/`). Each
//! holds an optional `applies` matcher and a list of `checks`. Field paths are
//! dotted (`spec.owner`); `$` addresses the entity root.

use serde::Deserialize;
use serde_json::Value as Json;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Clone)]
/// Root policy loaded from an embedded TOML file.
pub struct Policy {
    #[serde(default)]
    pub applies: Option<Applies>,
    #[serde(default)]
    pub checks: Vec<Check>,
}

#[derive(Debug, Deserialize, Clone)]
/// Selects the entities a kind policy is evaluated against.
pub struct Applies {
    pub kind: String,
    #[serde(default)]
    pub api_versions: Vec<String>,
}

impl Applies {
    /// Whether an entity with this `kind`/`apiVersion` pair is covered.
    /// An empty `api_versions` list accepts any version.
    pub fn matches(&self, kind: &str, api_version: &str) -> bool {
        self.kind == kind
            && (self.api_versions.is_empty() || self.api_versions.iter().any(|v| v == api_version))
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
/// Severity attached to a check. Only `Error` fails a file.
pub enum Level {
    #[default]
    Error,
    #[serde(alias = "warning")]
    Warn,
    Info,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "kind")]
/// Checks supported by the engine.
pub enum Check {
    #[serde(rename = "required")]
    Required {
        fields: Vec<String>,
        message: Option<String>,
        #[serde(default)]
        level: Level,
    },
    #[serde(rename = "type")]
    Type {
        #[serde(default)]
        /// Map of field paths to expected kinds (string|number|integer|boolean|array|object|null)
        fields: BTreeMap<String, String>,
        message: Option<String>,
        #[serde(default)]
        level: Level,
    },
    #[serde(rename = "const")]
    Const {
        field: String,
        value: Json,
        message: Option<String>,
        #[serde(default)]
        level: Level,
    },
    #[serde(rename = "pattern")]
    Pattern {
        field: String,
        regex: String,
        message: Option<String>,
        #[serde(default)]
        level: Level,
    },
    #[serde(rename = "enum")]
    Enum {
        field: String,
        values: Vec<Json>,
        message: Option<String>,
        #[serde(default)]
        level: Level,
    },
    #[serde(rename = "minLength")]
    MinLength {
        field: String,
        min: usize,
        message: Option<String>,
        #[serde(default)]
        level: Level,
    },
    #[serde(rename = "maxLength")]
    MaxLength {
        field: String,
        max: usize,
        message: Option<String>,
        #[serde(default)]
        level: Level,
    },
    /// Object at `field` may only contain the listed keys.
    #[serde(rename = "allowedKeys")]
    AllowedKeys {
        field: String,
        keys: Vec<String>,
        message: Option<String>,
        #[serde(default)]
        level: Level,
    },
    /// Every key of the object at `field` must match `regex`.
    #[serde(rename = "keyPattern")]
    KeyPattern {
        field: String,
        regex: String,
        message: Option<String>,
        #[serde(default)]
        level: Level,
    },
    /// Every string item (array) or value (object) at `field` must match `regex`.
    #[serde(rename = "eachPattern")]
    EachPattern {
        field: String,
        regex: String,
        message: Option<String>,
        #[serde(default)]
        level: Level,
    },
    /// Every item (array) or value (object) at `field` must be of the given kind.
    #[serde(rename = "itemType")]
    ItemType {
        field: String,
        item: String,
        message: Option<String>,
        #[serde(default)]
        level: Level,
    },
    /// Object items of the array at `field` must carry `required` keys and
    /// match the kinds in `types` where present.
    #[serde(rename = "itemFields")]
    ItemFields {
        field: String,
        #[serde(default)]
        required: Vec<String>,
        #[serde(default)]
        types: BTreeMap<String, String>,
        message: Option<String>,
        #[serde(default)]
        level: Level,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy_with_applies_and_checks() {
        let src = r#"
[applies]
kind = "Component"
api_versions = ["backstage.io/v1alpha1"]

[[checks]]
kind = "required"
fields = ["spec.owner"]

[[checks]]
kind = "type"
level = "warning"
[checks.fields]
"spec.type" = "string"
"#;
        let policy: Policy = toml::from_str(src).unwrap();
        let applies = policy.applies.unwrap();
        assert!(applies.matches("Component", "backstage.io/v1alpha1"));
        assert!(!applies.matches("Component", "backstage.io/v1beta1"));
        assert!(!applies.matches("component", "backstage.io/v1alpha1"));
        assert_eq!(policy.checks.len(), 2);
        match &policy.checks[1] {
            Check::Type { fields, level, .. } => {
                assert_eq!(fields.get("spec.type").map(String::as_str), Some("string"));
                assert_eq!(*level, Level::Warn);
            }
            _ => panic!("expected type check"),
        }
    }

    #[test]
    fn test_applies_without_versions_accepts_any() {
        let a = Applies {
            kind: "User".into(),
            api_versions: Vec::new(),
        };
        assert!(a.matches("User", "anything/v9"));
    }
}
