//! Embedded entity and kind policies.
//!
//! The entity policy runs on every document; a kind policy runs only when its
//! `applies` matcher selects the entity's `kind` and `apiVersion`.

use crate::checks::{run_checks, Violation};
use crate::error::ValidationError;
use crate::models::policy::{Level, Policy};
use serde_json::Value as Json;

const ENTITY_POLICY: &str = include_str!("../../policies/entity.toml");

const KIND_POLICIES: [(&str, &str); 6] = [
    ("api", include_str!("../../policies/kinds/api.toml")),
    ("component", include_str!("../../policies/kinds/component.toml")),
    ("group", include_str!("../../policies/kinds/group.toml")),
    ("location", include_str!("../../policies/kinds/location.toml")),
    ("template", include_str!("../../policies/kinds/template.toml")),
    ("user", include_str!("../../policies/kinds/user.toml")),
];

pub const DEFAULT_NAMESPACE: &str = "default";

/// Outcome of kind validation for one entity.
#[derive(Debug, Default)]
pub struct KindReport {
    /// Names of the kind validators that accepted the entity.
    pub validated: Vec<String>,
    pub warnings: Vec<Violation>,
}

pub struct RuleSet {
    entity: Policy,
    kinds: Vec<(String, Policy)>,
}

fn parse_policy(name: &str, src: &str) -> Result<Policy, ValidationError> {
    toml::from_str(src).map_err(|e| ValidationError::Schema {
        path: format!("policies/{}.toml", name),
        message: e.to_string(),
    })
}

fn split_violations(violations: Vec<Violation>) -> (Vec<Violation>, Vec<Violation>) {
    violations.into_iter().partition(|v| v.level == Level::Error)
}

fn join_messages(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl RuleSet {
    /// Load the policies compiled into the binary.
    pub fn builtin() -> Result<Self, ValidationError> {
        let entity = parse_policy("entity", ENTITY_POLICY)?;
        let kinds = KIND_POLICIES
            .iter()
            .map(|(name, src)| -> Result<(String, Policy), ValidationError> {
                Ok((name.to_string(), parse_policy(&format!("kinds/{}", name), src)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entity, kinds })
    }

    /// Enforce the entity policy, then default `metadata.namespace`.
    ///
    /// Returns warning-level violations; error-level ones fail the entity.
    pub fn enforce_entity(&self, entity: &mut Json) -> Result<Vec<Violation>, ValidationError> {
        let (errors, warnings) = split_violations(run_checks(&self.entity.checks, entity));
        if !errors.is_empty() {
            return Err(ValidationError::Policy(join_messages(&errors)));
        }
        if let Some(Json::Object(meta)) = entity.get_mut("metadata") {
            meta.entry("namespace")
                .or_insert_with(|| Json::String(DEFAULT_NAMESPACE.to_string()));
        }
        Ok(warnings)
    }

    /// Run every kind policy whose matcher selects this entity.
    pub fn check_kind(&self, entity: &Json) -> Result<KindReport, ValidationError> {
        let kind = entity.get("kind").and_then(Json::as_str).unwrap_or_default();
        let api_version = entity
            .get("apiVersion")
            .and_then(Json::as_str)
            .unwrap_or_default();
        let mut report = KindReport::default();
        for (name, policy) in &self.kinds {
            let Some(applies) = policy.applies.as_ref() else {
                continue;
            };
            if !applies.matches(kind, api_version) {
                continue;
            }
            let (errors, warnings) = split_violations(run_checks(&policy.checks, entity));
            if !errors.is_empty() {
                return Err(ValidationError::Kind {
                    kind: kind.to_string(),
                    message: join_messages(&errors),
                });
            }
            report.warnings.extend(warnings);
            report.validated.push(name.clone());
        }
        Ok(report)
    }
}
