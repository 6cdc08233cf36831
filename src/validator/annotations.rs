//! Annotation validation through JSON Schema.
//!
//! The bundled schema covers well-known annotation formats. A custom schema
//! (`-l` / `validationSchemaFileLocation`) replaces it for a run; it may be
//! written in JSON or, by extension, YAML.

use crate::error::ValidationError;
use jsonschema::Validator;
use serde_json::Value as Json;
use std::fs;
use std::path::Path;

const BUILTIN_SCHEMA: &str = include_str!("../../schemas/annotations.schema.json");

#[derive(Debug)]
pub struct AnnotationSchema {
    validator: Validator,
}

impl AnnotationSchema {
    pub fn builtin() -> Result<Self, ValidationError> {
        let schema: Json =
            serde_json::from_str(BUILTIN_SCHEMA).map_err(|e| ValidationError::Schema {
                path: "schemas/annotations.schema.json".into(),
                message: e.to_string(),
            })?;
        Self::compile(&schema, "schemas/annotations.schema.json")
    }

    /// Load and compile a schema from disk.
    pub fn from_file(path: &str) -> Result<Self, ValidationError> {
        let schema_err = |message: String| ValidationError::Schema {
            path: path.to_string(),
            message,
        };
        let src = fs::read_to_string(path).map_err(|e| schema_err(e.to_string()))?;
        let is_yaml = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        let schema: Json = if is_yaml {
            serde_yaml::from_str(&src).map_err(|e| schema_err(e.to_string()))?
        } else {
            serde_json::from_str(&src).map_err(|e| schema_err(e.to_string()))?
        };
        Self::compile(&schema, path)
    }

    fn compile(schema: &Json, origin: &str) -> Result<Self, ValidationError> {
        let validator = jsonschema::validator_for(schema).map_err(|e| ValidationError::Schema {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { validator })
    }

    /// Validate an entity; the first schema error is reported.
    pub fn validate(&self, entity: &Json) -> Result<(), ValidationError> {
        let Some(err) = self.validator.iter_errors(entity).next() else {
            return Ok(());
        };
        let location = err.instance_path.to_string();
        let location = if location.is_empty() {
            "<root>"
        } else {
            location.as_str()
        };
        Err(ValidationError::Annotation(format!("{} {}", location, err)))
    }
}
