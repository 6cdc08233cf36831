//! Backstage entity validator library.
//!
//! This crate exposes the programmatic APIs behind the `validate-entity`
//! binary: it validates Backstage catalog entity files and reports the
//! aggregate result to the console or to a GitHub Actions run.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `inputs`: File list collection from action inputs, arguments, and STDIN.
//! - `runner`: The validation loop, summary, and exit code.
//! - `validator`: Entity file validation (YAML, policies, annotation schema).
//! - `checks`: Implementation of policy checks.
//! - `ci`: GitHub Actions inputs and reporting.
//! - `models`: Run configuration, per-file outcomes, and policy structs.
//! - `output`: Human/JSON printers for run results.
//! - `error`: Error types.
//! - `logging`: Tracing subscriber setup.
//! - `utils`: Supporting helpers.
pub mod checks;
pub mod ci;
pub mod cli;
pub mod config;
pub mod error;
pub mod inputs;
pub mod logging;
pub mod models;
pub mod output;
pub mod runner;
pub mod utils;
pub mod validator;
