//! Collection of the files to validate.
//!
//! Sources are concatenated in a fixed order: action `path` input, command
//! line arguments, then STDIN lines. Configured default patterns are used only
//! when all of those are empty. Every entry is then glob-expanded; entries
//! matching nothing are dropped.

use crate::error::InputError;
use glob::glob;
use std::io::BufRead;

/// Raw file entries, before glob expansion.
#[derive(Debug, Default)]
pub struct Sources<'a> {
    pub ci_paths: &'a [String],
    pub args: &'a [String],
    pub stdin: Vec<String>,
    pub default_patterns: &'a [String],
}

/// Split the comma-separated action `path` input.
pub fn split_ci_paths(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read one file path per line; blank lines are skipped.
pub fn read_file_list(reader: impl BufRead) -> Result<Vec<String>, InputError> {
    let mut files = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if !line.is_empty() {
            files.push(line.to_string());
        }
    }
    Ok(files)
}

/// Expand each pattern with `glob`, keeping pattern order.
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<String>, InputError> {
    let mut files = Vec::new();
    for pat in patterns {
        let entries = glob(pat).map_err(|source| InputError::Pattern {
            pattern: pat.clone(),
            source,
        })?;
        let before = files.len();
        for entry in entries {
            match entry {
                Ok(p) => files.push(p.to_string_lossy().to_string()),
                Err(e) => tracing::warn!(pattern = %pat, error = %e, "skipping unreadable path"),
            }
        }
        if files.len() == before {
            tracing::debug!(pattern = %pat, "pattern matched no files");
        }
    }
    Ok(files)
}

/// Assemble and expand the final file list.
pub fn collect_files(sources: Sources<'_>) -> Result<Vec<String>, InputError> {
    let mut raw: Vec<String> = Vec::new();
    raw.extend_from_slice(sources.ci_paths);
    raw.extend_from_slice(sources.args);
    raw.extend(sources.stdin);
    if raw.is_empty() {
        raw.extend_from_slice(sources.default_patterns);
    }
    let files = expand_patterns(&raw)?;
    tracing::debug!(entries = raw.len(), files = files.len(), "collected files");
    Ok(files)
}
