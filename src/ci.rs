//! CI signaling channel.
//!
//! The runner talks to CI through `CiReporter`. `GithubActionsReporter`
//! speaks the GitHub Actions protocol: outputs are appended to the file named
//! by `GITHUB_OUTPUT`, failures are `::error::` workflow commands on stdout.

use crate::models::OutputMode;
use crate::utils::Stream;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

pub trait CiReporter {
    /// Publish the time of a successful run.
    fn record_success(&mut self, timestamp: &str) -> io::Result<()>;
    /// Mark the run as failed with one consolidated message.
    fn report_failure(&mut self, message: &str) -> io::Result<()>;
}

/// Reporter for plain CLI runs.
pub struct NoopReporter;

impl CiReporter for NoopReporter {
    fn record_success(&mut self, _timestamp: &str) -> io::Result<()> {
        Ok(())
    }

    fn report_failure(&mut self, _message: &str) -> io::Result<()> {
        Ok(())
    }
}

pub struct GithubActionsReporter<W: Write> {
    commands: W,
    output_file: Option<PathBuf>,
}

/// Stream that carries workflow commands. The Actions runner reads commands
/// from both; stdout is left alone when it holds the JSON summary.
pub fn command_stream(output: OutputMode) -> Stream {
    match output {
        OutputMode::Human => Stream::Stdout,
        OutputMode::Json => Stream::Stderr,
    }
}

impl GithubActionsReporter<Box<dyn Write>> {
    pub fn from_env(output: OutputMode) -> Self {
        let commands: Box<dyn Write> = match command_stream(output) {
            Stream::Stdout => Box::new(io::stdout()),
            Stream::Stderr => Box::new(io::stderr()),
        };
        Self::new(
            commands,
            std::env::var_os("GITHUB_OUTPUT")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        )
    }
}

impl<W: Write> GithubActionsReporter<W> {
    pub fn new(commands: W, output_file: Option<PathBuf>) -> Self {
        Self {
            commands,
            output_file,
        }
    }

    fn set_output(&mut self, name: &str, value: &str) -> io::Result<()> {
        match &self.output_file {
            Some(path) => {
                let mut f = OpenOptions::new().create(true).append(true).open(path)?;
                writeln!(f, "{}={}", name, value)
            }
            None => writeln!(
                self.commands,
                "::set-output name={}::{}",
                name,
                escape_data(value)
            ),
        }
    }
}

impl<W: Write> CiReporter for GithubActionsReporter<W> {
    fn record_success(&mut self, timestamp: &str) -> io::Result<()> {
        self.set_output("time", timestamp)
    }

    fn report_failure(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.commands, "::error::{}", escape_data(message))?;
        self.commands.flush()
    }
}

/// Escape a workflow command payload.
pub fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Local time of day with UTC offset, e.g. `14:05:09 GMT+0200`.
pub fn timestamp() -> String {
    Local::now().format("%H:%M:%S GMT%z").to_string()
}

/// Action inputs as GitHub exposes them (`INPUT_<NAME>`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiInputs {
    pub path: Option<String>,
    pub verbose: Option<String>,
    pub schema_location: Option<String>,
}

impl CiInputs {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Read inputs through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let input = |name: &str| {
            let key = format!("INPUT_{}", name.replace(' ', "_").to_uppercase());
            lookup(&key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            path: input("path"),
            verbose: input("verbose"),
            schema_location: input("validationSchemaFileLocation"),
        }
    }

    /// A `path` input means we are running as an action.
    pub fn is_ci(&self) -> bool {
        self.path.is_some()
    }
}
