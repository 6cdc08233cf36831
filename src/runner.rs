//! Validation runner: validates every file and reports the aggregate.
//!
//! Files are processed strictly in order, one at a time, and a failure never
//! stops the run. Per-file failures (including a panicking validator) become
//! `FileOutcome`s; the caller only sees the summary and the exit code.

use crate::ci::{self, CiReporter};
use crate::models::{FileOutcome, OutputMode, RunConfig, RunSummary};
use crate::output;
use crate::validator::EntityValidator;
use std::any::Any;
use std::cell::Cell;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

thread_local! {
    static IN_VALIDATOR: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

// Panics raised inside a validator call are recorded as file failures, so the
// default hook must not print them. Other panics keep the previous hook.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if IN_VALIDATOR.with(Cell::get) {
                tracing::debug!(panic = %info, "validator panicked");
            } else {
                previous(info);
            }
        }));
    });
}

/// Whether the current thread is inside a validator call.
pub fn in_validator() -> bool {
    IN_VALIDATOR.with(Cell::get)
}

/// Output and error streams the runner writes to.
pub struct Console<'a> {
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

/// Validate `files` and return the process exit code (0 or 1).
pub fn run(
    files: &[String],
    config: &RunConfig,
    validator: &dyn EntityValidator,
    reporter: &mut dyn CiReporter,
    console: &mut Console<'_>,
) -> i32 {
    validate_files(files, config, validator, reporter, console).exit_code()
}

/// Validate `files` and return the run summary.
pub fn validate_files(
    files: &[String],
    config: &RunConfig,
    validator: &dyn EntityValidator,
    reporter: &mut dyn CiReporter,
    console: &mut Console<'_>,
) -> RunSummary {
    let mut outcomes: Vec<FileOutcome> = Vec::with_capacity(files.len());
    for path in files {
        tracing::info!(file = %path, "validating");
        let outcome = match validate_one(validator, path, config) {
            Ok(()) => FileOutcome::passed(path.as_str()),
            Err(message) => {
                tracing::debug!(file = %path, error = %message, "validation failed");
                if !config.ci_mode {
                    emit(output::write_file_failure(
                        console.err,
                        path,
                        &message,
                        config.color,
                    ));
                }
                FileOutcome::failed(path.as_str(), message)
            }
        };
        outcomes.push(outcome);
    }

    let summary = RunSummary::from_outcomes(outcomes);
    report(&summary, config, reporter, console);
    summary
}

fn validate_one(
    validator: &dyn EntityValidator,
    path: &str,
    config: &RunConfig,
) -> Result<(), String> {
    let schema = config.schema_override.as_deref();
    install_quiet_hook();
    IN_VALIDATOR.with(|f| f.set(true));
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        validator.validate_file(path, config.verbose, schema)
    }));
    IN_VALIDATOR.with(|f| f.set(false));
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("validator panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn report(
    summary: &RunSummary,
    config: &RunConfig,
    reporter: &mut dyn CiReporter,
    console: &mut Console<'_>,
) {
    if config.output == OutputMode::Json {
        emit(output::write_json(console.out, summary));
    }
    if summary.ok() {
        if config.verbose && config.output == OutputMode::Human {
            emit(output::write_success(console.out, summary, config.color));
        }
        if config.ci_mode {
            emit(reporter.record_success(&ci::timestamp()));
        }
        return;
    }
    if config.ci_mode {
        emit(reporter.report_failure(&output::ci_failure_message(summary)));
    } else if config.output == OutputMode::Human {
        emit(output::write_failure_summary(
            console.err,
            summary,
            config.verbose,
            config.color,
        ));
    }
}

// Console and CI write failures are not run failures.
fn emit(res: io::Result<()>) {
    if let Err(e) = res {
        tracing::warn!(error = %e, "failed to write run output");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Validator double: records calls, fails the configured paths.
    #[derive(Default)]
    struct FakeValidator {
        calls: RefCell<Vec<(String, bool, Option<String>)>>,
        silenced: RefCell<Vec<bool>>,
        failures: HashMap<String, String>,
        panics: Vec<String>,
    }

    impl FakeValidator {
        fn failing(pairs: &[(&str, &str)]) -> Self {
            Self {
                failures: pairs
                    .iter()
                    .map(|(p, m)| (p.to_string(), m.to_string()))
                    .collect(),
                ..Self::default()
            }
        }

        fn called_paths(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|c| c.0.clone()).collect()
        }
    }

    impl EntityValidator for FakeValidator {
        fn validate_file(
            &self,
            path: &str,
            verbose: bool,
            schema_override: Option<&str>,
        ) -> Result<(), ValidationError> {
            self.calls.borrow_mut().push((
                path.to_string(),
                verbose,
                schema_override.map(str::to_string),
            ));
            self.silenced.borrow_mut().push(in_validator());
            if self.panics.iter().any(|p| p == path) {
                panic!("exploded on {}", path);
            }
            match self.failures.get(path) {
                Some(m) => Err(ValidationError::Policy(m.clone())),
                None => Ok(()),
            }
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        successes: Vec<String>,
        failures: Vec<String>,
    }

    impl CiReporter for RecordingReporter {
        fn record_success(&mut self, timestamp: &str) -> io::Result<()> {
            self.successes.push(timestamp.to_string());
            Ok(())
        }

        fn report_failure(&mut self, message: &str) -> io::Result<()> {
            self.failures.push(message.to_string());
            Ok(())
        }
    }

    struct Captured {
        summary: RunSummary,
        out: String,
        err: String,
    }

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn config(verbose: bool, ci_mode: bool) -> RunConfig {
        RunConfig {
            verbose,
            ci_mode,
            ..RunConfig::default()
        }
    }

    fn capture(
        files: &[String],
        cfg: &RunConfig,
        v: &FakeValidator,
        r: &mut RecordingReporter,
    ) -> Captured {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let summary = {
            let mut console = Console {
                out: &mut out,
                err: &mut err,
            };
            validate_files(files, cfg, v, r, &mut console)
        };
        Captured {
            summary,
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    #[test]
    fn test_all_files_attempted_despite_failures() {
        let v = FakeValidator::failing(&[("file1.yaml", "bad one"), ("file3.yaml", "bad three")]);
        let mut r = RecordingReporter::default();
        let input = files(&["file1.yaml", "file2.yaml", "file3.yaml"]);
        let c = capture(&input, &config(true, false), &v, &mut r);

        assert_eq!(c.summary.exit_code(), 1);
        assert_eq!(v.called_paths(), input);
        assert!(c.err.contains("Total files: 3"));
        assert!(c.err.contains("Passed: 1"));
        assert!(c.err.contains("Failed: 2"));
        assert!(c.err.contains("file1.yaml: Entity policy violation: bad one"));
        assert!(c.err.contains("file3.yaml: Entity policy violation: bad three"));
        assert!(r.failures.is_empty());
    }

    #[test]
    fn test_failures_are_printed_as_they_happen() {
        let v = FakeValidator::failing(&[("invalid.yaml", "Invalid entity")]);
        let mut r = RecordingReporter::default();
        let c = capture(&files(&["invalid.yaml", "ok.yaml"]), &config(false, false), &v, &mut r);
        let first_line = c.err.lines().next().unwrap();
        assert_eq!(
            first_line,
            "Failed to validate invalid.yaml: Entity policy violation: Invalid entity"
        );
        // quiet mode keeps the counts but drops the per-file detail list
        assert!(c.err.contains("Failed: 1"));
        assert!(!c.err.contains("Failed files:"));
    }

    #[test]
    fn test_empty_file_list() {
        let v = FakeValidator::default();
        let mut r = RecordingReporter::default();
        let c = capture(&[], &config(true, false), &v, &mut r);
        assert_eq!(c.summary.exit_code(), 0);
        assert_eq!(c.summary.total, 0);
        assert!(v.called_paths().is_empty());
    }

    #[test]
    fn test_success_verbose_reports_count() {
        let v = FakeValidator::default();
        let mut r = RecordingReporter::default();
        let c = capture(&files(&["a.yaml", "b.yaml", "c.yaml"]), &config(true, false), &v, &mut r);
        assert_eq!(c.summary.exit_code(), 0);
        assert!(c.out.contains("Successfully validated 3 file(s)"));
        assert!(c.err.is_empty());
        assert!(r.successes.is_empty());
    }

    #[test]
    fn test_success_quiet_prints_nothing() {
        let v = FakeValidator::default();
        let mut r = RecordingReporter::default();
        let c = capture(&files(&["a.yaml"]), &config(false, false), &v, &mut r);
        assert!(c.out.is_empty());
        assert!(c.err.is_empty());
    }

    #[test]
    fn test_ci_mode_consolidates_failures() {
        let v = FakeValidator::failing(&[("file1.yaml", "Error 1"), ("file2.yaml", "Error 2")]);
        let mut r = RecordingReporter::default();
        let c = capture(&files(&["file1.yaml", "file2.yaml"]), &config(true, true), &v, &mut r);

        assert_eq!(c.summary.exit_code(), 1);
        assert_eq!(r.failures.len(), 1);
        let msg = &r.failures[0];
        assert!(msg.contains("file1.yaml: Entity policy violation: Error 1"));
        assert!(msg.contains("file2.yaml: Entity policy violation: Error 2"));
        assert!(msg.contains("2 of 2 file(s) failed"));
        assert!(c.err.is_empty());
        assert!(r.successes.is_empty());
    }

    #[test]
    fn test_ci_mode_success_records_timestamp() {
        let v = FakeValidator::default();
        let mut r = RecordingReporter::default();
        let c = capture(&files(&["a.yaml"]), &config(false, true), &v, &mut r);
        assert_eq!(c.summary.exit_code(), 0);
        assert_eq!(r.successes.len(), 1);
        assert!(!r.successes[0].is_empty());
        assert!(r.failures.is_empty());
    }

    #[test]
    fn test_forwards_verbose_and_schema_override() {
        let v = FakeValidator::default();
        let mut r = RecordingReporter::default();
        let cfg = RunConfig {
            schema_override: Some("/path/to/schema.json".into()),
            ..config(false, false)
        };
        capture(&files(&["file.yaml"]), &cfg, &v, &mut r);
        let calls = v.calls.borrow();
        assert_eq!(
            calls[0],
            (
                "file.yaml".to_string(),
                false,
                Some("/path/to/schema.json".to_string())
            )
        );
    }

    #[test]
    fn test_duplicates_are_validated_each_time() {
        let v = FakeValidator::failing(&[("dup.yaml", "nope")]);
        let mut r = RecordingReporter::default();
        let c = capture(&files(&["dup.yaml", "dup.yaml"]), &config(false, false), &v, &mut r);
        assert_eq!(v.called_paths().len(), 2);
        assert_eq!(c.summary.failed.len(), 2);
    }

    #[test]
    fn test_panicking_validator_is_a_file_failure() {
        let v = FakeValidator {
            panics: vec!["boom.yaml".to_string()],
            ..FakeValidator::default()
        };
        let mut r = RecordingReporter::default();
        let c = capture(&files(&["boom.yaml", "after.yaml"]), &config(false, false), &v, &mut r);
        assert_eq!(v.called_paths(), files(&["boom.yaml", "after.yaml"]));
        assert_eq!(c.summary.passed, 1);
        assert_eq!(
            c.summary.failed[0].error_message(),
            Some("validator panicked: exploded on boom.yaml")
        );
    }

    #[test]
    fn test_panic_output_is_silenced_only_inside_validator() {
        let v = FakeValidator {
            panics: vec!["boom.yaml".to_string()],
            ..FakeValidator::default()
        };
        let mut r = RecordingReporter::default();
        let c = capture(&files(&["boom.yaml", "after.yaml"]), &config(false, true), &v, &mut r);
        assert_eq!(*v.silenced.borrow(), vec![true, true]);
        assert!(!in_validator());
        assert!(c.err.is_empty());
        assert_eq!(r.failures.len(), 1);
        assert!(r.failures[0].contains("boom.yaml: validator panicked: exploded on boom.yaml"));
    }

    #[test]
    fn test_json_output_replaces_human_summary() {
        let v = FakeValidator::failing(&[("b.yaml", "broken")]);
        let mut r = RecordingReporter::default();
        let cfg = RunConfig {
            output: OutputMode::Json,
            ..config(true, false)
        };
        let c = capture(&files(&["a.yaml", "b.yaml"]), &cfg, &v, &mut r);
        let parsed: serde_json::Value = serde_json::from_str(&c.out).unwrap();
        assert_eq!(parsed["total"], 2);
        assert_eq!(parsed["passed"], 1);
        assert_eq!(parsed["failed"][0]["path"], "b.yaml");
        assert!(c.err.contains("Failed to validate b.yaml"));
        assert!(!c.err.contains("Total files"));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let v = FakeValidator::failing(&[("x.yaml", "bad")]);
        let input = files(&["x.yaml", "y.yaml"]);
        let cfg = config(true, false);
        let mut r1 = RecordingReporter::default();
        let mut r2 = RecordingReporter::default();
        let first = capture(&input, &cfg, &v, &mut r1);
        let second = capture(&input, &cfg, &v, &mut r2);
        assert_eq!(first.summary, second.summary);
        assert_eq!(first.err, second.err);
        assert_eq!(first.summary.exit_code(), second.summary.exit_code());
    }

    #[test]
    fn test_run_returns_exit_code() {
        let v = FakeValidator::failing(&[("x.yaml", "bad")]);
        let mut r = RecordingReporter::default();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut console = Console {
            out: &mut out,
            err: &mut err,
        };
        assert_eq!(run(&files(&["x.yaml"]), &config(false, false), &v, &mut r, &mut console), 1);
        assert_eq!(run(&files(&["y.yaml"]), &config(false, false), &v, &mut r, &mut console), 0);
    }
}
