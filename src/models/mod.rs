//! Shared data models for run outcomes and validation policies.

pub mod policy;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// How the final summary is rendered.
pub enum OutputMode {
    #[default]
    Human,
    Json,
}

impl OutputMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Settings for one runner invocation.
pub struct RunConfig {
    pub verbose: bool,
    /// Route success/failure signaling through the CI reporter instead of
    /// console error output.
    pub ci_mode: bool,
    /// Forwarded untouched to the validator.
    pub schema_override: Option<String>,
    pub output: OutputMode,
    pub color: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of validating one file.
pub enum FileStatus {
    Passed,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One recorded per-file outcome.
pub struct FileOutcome {
    pub path: String,
    pub status: FileStatus,
}

// Flattened as {"path", "message"} so the JSON summary stays simple.
impl Serialize for FileOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("FileOutcome", 2)?;
        st.serialize_field("path", &self.path)?;
        st.serialize_field("message", &self.error_message())?;
        st.end()
    }
}

impl FileOutcome {
    pub fn passed(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Passed,
        }
    }

    pub fn failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Failed {
                message: message.into(),
            },
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.status, FileStatus::Passed)
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            FileStatus::Passed => None,
            FileStatus::Failed { message } => Some(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Aggregated outcome of a run.
///
/// Built only from the complete list of outcomes, so
/// `total == passed + failed.len()` always holds.
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: Vec<FileOutcome>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: Vec<FileOutcome>) -> Self {
        let total = outcomes.len();
        let failed: Vec<FileOutcome> = outcomes.into_iter().filter(|o| !o.succeeded()).collect();
        Self {
            total,
            passed: total - failed.len(),
            failed,
        }
    }

    pub fn ok(&self) -> bool {
        self.failed.is_empty()
    }

    /// Process exit code for this summary: 0 when every file passed.
    pub fn exit_code(&self) -> i32 {
        if self.ok() {
            0
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_hold_invariant() {
        let s = RunSummary::from_outcomes(vec![
            FileOutcome::failed("a.yaml", "boom"),
            FileOutcome::passed("b.yaml"),
            FileOutcome::failed("c.yaml", "bang"),
        ]);
        assert_eq!(s.total, 3);
        assert_eq!(s.passed, 1);
        assert_eq!(s.total, s.passed + s.failed.len());
        assert_eq!(s.failed[0].path, "a.yaml");
        assert_eq!(s.failed[1].error_message(), Some("bang"));
        assert_eq!(s.exit_code(), 1);
    }

    #[test]
    fn test_empty_summary_is_ok() {
        let s = RunSummary::from_outcomes(Vec::new());
        assert!(s.ok());
        assert_eq!(s.exit_code(), 0);
    }

    #[test]
    fn test_output_mode_parse() {
        assert_eq!(OutputMode::parse("JSON"), Some(OutputMode::Json));
        assert_eq!(OutputMode::parse(" human "), Some(OutputMode::Human));
        assert_eq!(OutputMode::parse("xml"), None);
    }
}
