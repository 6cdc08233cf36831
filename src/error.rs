//! Error types for entity validation, configuration, and input collection.

use std::path::PathBuf;

use thiserror::Error;

/// Why a single entity file failed validation.
///
/// The `Display` text is what ends up in the run summary and in CI
/// annotations, so variants read as user-facing sentences.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unable to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("file contains no entity documents")]
    Empty,
    #[error("Entity policy violation: {0}")]
    Policy(String),
    #[error("Entity of kind '{kind}' is invalid: {message}")]
    Kind { kind: String, message: String },
    #[error("Malformed annotation, {0}")]
    Annotation(String),
    #[error("unable to load validation schema {path}: {message}")]
    Schema { path: String, message: String },
    #[error("document {index}: {source}")]
    Document {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

/// Problems with the discovered config file or effective settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config {} is not valid TOML: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("config {} is not valid YAML: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("unknown output mode '{0}' (expected human or json)")]
    OutputMode(String),
}

/// Failures while assembling the list of files to validate.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("unable to read file list from standard input: {0}")]
    Stdin(#[from] std::io::Error),
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_error_wraps_inner_message() {
        let err = ValidationError::Document {
            index: 2,
            source: Box::new(ValidationError::Policy("bad name".into())),
        };
        assert_eq!(
            err.to_string(),
            "document 2: Entity policy violation: bad name"
        );
    }

    #[test]
    fn test_kind_error_names_the_kind() {
        let err = ValidationError::Kind {
            kind: "Component".into(),
            message: "missing required field 'spec.owner'".into(),
        };
        assert!(err.to_string().contains("'Component'"));
        assert!(err.to_string().contains("spec.owner"));
    }
}
