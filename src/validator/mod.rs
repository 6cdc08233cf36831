//! Per-file entity validation.
//!
//! `EntityValidator` is the seam the runner drives; `CatalogValidator` is the
//! implementation used by the binary. A file passes when every YAML document
//! in it passes the entity policy, any matching kind policy, and the
//! annotation schema.

pub mod annotations;
pub mod document;
pub mod rules;

use crate::error::ValidationError;
use crate::utils;
use annotations::AnnotationSchema;
use rules::RuleSet;
use serde_json::Value as Json;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::rc::Rc;

/// Validate one entity file.
pub trait EntityValidator {
    /// `schema_override` names a custom validation schema, forwarded as-is
    /// from the run configuration.
    fn validate_file(
        &self,
        path: &str,
        verbose: bool,
        schema_override: Option<&str>,
    ) -> Result<(), ValidationError>;
}

/// Validator backed by the embedded policies and annotation schema.
pub struct CatalogValidator {
    rules: RuleSet,
    annotations: AnnotationSchema,
    /// Custom schemas compiled so far, keyed by path.
    custom: RefCell<HashMap<String, Rc<AnnotationSchema>>>,
}

impl CatalogValidator {
    pub fn new() -> Result<Self, ValidationError> {
        Ok(Self {
            rules: RuleSet::builtin()?,
            annotations: AnnotationSchema::builtin()?,
            custom: RefCell::new(HashMap::new()),
        })
    }

    fn custom_schema(&self, path: &str) -> Result<Rc<AnnotationSchema>, ValidationError> {
        if let Some(schema) = self.custom.borrow().get(path) {
            return Ok(Rc::clone(schema));
        }
        tracing::debug!(schema = path, "loading custom validation schema");
        let schema = Rc::new(AnnotationSchema::from_file(path)?);
        self.custom
            .borrow_mut()
            .insert(path.to_string(), Rc::clone(&schema));
        Ok(schema)
    }

    fn validate_entity(
        &self,
        entity: Json,
        verbose: bool,
        annotations: &AnnotationSchema,
    ) -> Result<(), ValidationError> {
        let mut entity = document::substitute_placeholders(entity);
        let mut warnings = self.rules.enforce_entity(&mut entity)?;
        if verbose {
            println!("Running file through validators\n");
        }
        let report = self.rules.check_kind(&entity)?;
        if verbose {
            for name in &report.validated {
                println!("Validated entity kind '{}' successfully.\n", name);
            }
        }
        warnings.extend(report.warnings);
        annotations.validate(&entity)?;
        if verbose {
            for w in &warnings {
                println!("{} {}", utils::level_prefix(w.level), w.message);
            }
            let dump = serde_yaml::to_string(&entity).unwrap_or_default();
            println!("Entity Schema policy validated\n {}", dump);
        }
        Ok(())
    }
}

impl EntityValidator for CatalogValidator {
    fn validate_file(
        &self,
        path: &str,
        verbose: bool,
        schema_override: Option<&str>,
    ) -> Result<(), ValidationError> {
        if verbose {
            println!("Validating Entity Schema for file {}\n", path);
        }
        let content = fs::read_to_string(path).map_err(|source| ValidationError::Read {
            path: path.to_string(),
            source,
        })?;
        let docs = document::parse_documents(&content)?;
        if docs.is_empty() {
            return Err(ValidationError::Empty);
        }
        let custom = match schema_override {
            Some(p) => Some(self.custom_schema(p)?),
            None => None,
        };
        let annotations = custom.as_deref().unwrap_or(&self.annotations);
        let multi = docs.len() > 1;
        for (idx, doc) in docs.into_iter().enumerate() {
            tracing::debug!(file = path, document = idx + 1, "validating entity document");
            self.validate_entity(doc, verbose, annotations)
                .map_err(|e| {
                    if multi {
                        ValidationError::Document {
                            index: idx + 1,
                            source: Box::new(e),
                        }
                    } else {
                        e
                    }
                })?;
        }
        Ok(())
    }
}
