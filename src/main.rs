//! `validate-entity` binary entry point.
//! Resolves configuration, collects files, and hands them to the runner.

use backstage_entity_validator::ci::{CiInputs, CiReporter, GithubActionsReporter, NoopReporter};
use backstage_entity_validator::cli::Cli;
use backstage_entity_validator::inputs::{self, Sources};
use backstage_entity_validator::models::{OutputMode, RunConfig};
use backstage_entity_validator::runner::{self, Console};
use backstage_entity_validator::validator::CatalogValidator;
use backstage_entity_validator::{config, logging, utils};
use clap::Parser;
use std::io;

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", utils::error_prefix());
            1
        }
    };
    std::process::exit(code);
}

fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.quiet)?;

    let ci_inputs = CiInputs::from_env();
    let eff = config::resolve_effective(&cli.overrides(), &ci_inputs)?;
    if !eff.config_found {
        tracing::debug!(root = %eff.repo_root.display(), "no entity-validator config found; using defaults");
    }

    let stdin_files = if cli.stdin {
        inputs::read_file_list(io::stdin().lock())?
    } else {
        Vec::new()
    };
    let used_defaults =
        eff.ci_paths.is_empty() && cli.files.is_empty() && stdin_files.is_empty();
    if used_defaults && !eff.default_patterns.is_empty() && eff.output == OutputMode::Human {
        eprintln!(
            "{} Using default patterns: [{}]",
            utils::info_prefix(),
            eff.default_patterns.join(", ")
        );
    }
    let files = inputs::collect_files(Sources {
        ci_paths: &eff.ci_paths,
        args: &cli.files,
        stdin: stdin_files,
        default_patterns: &eff.default_patterns,
    })?;

    if files.is_empty() {
        eprintln!("No files specified to validate");
        return Ok(1);
    }

    let validator = CatalogValidator::new()?;
    let mut reporter: Box<dyn CiReporter> = if eff.ci_mode {
        Box::new(GithubActionsReporter::from_env(eff.output))
    } else {
        Box::new(NoopReporter)
    };

    let run_config = RunConfig {
        // Progress lines would corrupt the JSON document on stdout.
        verbose: eff.verbose && eff.output == OutputMode::Human,
        ci_mode: eff.ci_mode,
        schema_override: eff.schema.clone(),
        output: eff.output,
        color: utils::console_colors() && eff.output == OutputMode::Human,
    };

    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();
    let mut console = Console {
        out: &mut out,
        err: &mut err,
    };
    Ok(runner::run(
        &files,
        &run_config,
        &validator,
        reporter.as_mut(),
        &mut console,
    ))
}
