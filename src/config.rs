//! Configuration discovery and effective settings resolution.
//!
//! The validator reads `entity-validator.toml|yaml|yml` from the repository
//! root (or closest ancestor) and merges it with GitHub Action inputs and CLI
//! flags to produce an `Effective` config.
//! Defaults:
//! - `verbose`: true
//! - `schema`: none (bundled annotation schema)
//! - `output`: `human`
//! - `files`: none
//!
//! Precedence: CLI > action inputs > config file > defaults, except that the
//! action's `verbose` input overrides `-q`.

use crate::ci::CiInputs;
use crate::error::ConfigError;
use crate::models::OutputMode;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_NAMES: [&str; 3] = [
    "entity-validator.toml",
    "entity-validator.yaml",
    "entity-validator.yml",
];

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
/// Root configuration loaded from `entity-validator.toml|yaml`.
pub struct ValidatorConfig {
    pub verbose: Option<bool>,
    /// Custom validation schema path.
    pub schema: Option<String>,
    pub output: Option<String>,
    /// Default file patterns, relative to the config root, used when no files
    /// are given on the command line, STDIN, or action input.
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default)]
/// Flags taken from the command line.
pub struct CliOverrides {
    pub repo_root: Option<String>,
    pub quiet: bool,
    pub schema_location: Option<String>,
    pub output: Option<String>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by the binary after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_found: bool,
    pub verbose: bool,
    pub ci_mode: bool,
    pub schema: Option<String>,
    pub output: OutputMode,
    /// Raw entries of the action `path` input, split on commas.
    pub ci_paths: Vec<String>,
    /// Config `files` patterns joined onto `repo_root`.
    pub default_patterns: Vec<String>,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when an `entity-validator.*` config or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `ValidatorConfig` from the first config file present in `root`.
pub fn load_config(root: &Path) -> Result<Option<ValidatorConfig>, ConfigError> {
    for name in CONFIG_NAMES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let cfg = if name.ends_with(".toml") {
            toml::from_str(&s).map_err(|source| ConfigError::Toml { path, source })?
        } else {
            serde_yaml::from_str(&s).map_err(|source| ConfigError::Yaml { path, source })?
        };
        return Ok(Some(cfg));
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, action inputs, discovered config,
/// and defaults.
pub fn resolve_effective(cli: &CliOverrides, inputs: &CiInputs) -> Result<Effective, ConfigError> {
    let start = PathBuf::from(cli.repo_root.as_deref().unwrap_or("."));
    // Absolute start so the upward walk can leave the working directory.
    let start = fs::canonicalize(&start).unwrap_or(start);
    let repo_root = detect_repo_root(&start);
    let loaded = load_config(&repo_root)?;
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();
    tracing::debug!(root = %repo_root.display(), config_found, "resolved repository root");

    let verbose = match inputs.verbose.as_deref() {
        Some(v) => v == "true",
        None if cli.quiet => false,
        None => cfg.verbose.unwrap_or(true),
    };

    let schema = cli
        .schema_location
        .clone()
        .or_else(|| inputs.schema_location.clone())
        .or(cfg.schema.map(|s| resolve_relative(&repo_root, &s)));

    let output_src = cli.output.clone().or(cfg.output);
    let output = match output_src {
        Some(s) => OutputMode::parse(&s).ok_or(ConfigError::OutputMode(s))?,
        None => OutputMode::Human,
    };

    let ci_paths = inputs
        .path
        .as_deref()
        .map(crate::inputs::split_ci_paths)
        .unwrap_or_default();

    let default_patterns = cfg
        .files
        .iter()
        .map(|p| resolve_relative(&repo_root, p))
        .collect();

    Ok(Effective {
        repo_root,
        config_found,
        verbose,
        ci_mode: inputs.is_ci(),
        schema,
        output,
        ci_paths,
        default_patterns,
    })
}

fn resolve_relative(root: &Path, p: &str) -> String {
    if Path::new(p).is_absolute() {
        p.to_string()
    } else {
        root.join(p).to_string_lossy().to_string()
    }
}
