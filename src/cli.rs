//! CLI argument parsing via `clap`.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "validate-entity",
    version,
    about = "Validates Backstage entity definition files",
    long_about = "Validates Backstage entity definition files. Files may be specified as arguments or via STDIN, one per line.\n\nConfiguration precedence: CLI > action inputs > entity-validator.toml > defaults.",
    after_help = "Examples:\n  validate-entity catalog-info.yaml\n  validate-entity 'services/*/catalog-info.yaml'\n  git ls-files '*catalog-info.yaml' | validate-entity -i -q\n  validate-entity -l schemas/annotations.json catalog-info.yaml"
)]
/// Command line options for `validate-entity`.
pub struct Cli {
    #[arg(short = 'q', long, action = clap::ArgAction::SetTrue, help = "minimal output while validating entities")]
    pub quiet: bool,
    #[arg(short = 'i', long = "stdin", action = clap::ArgAction::SetTrue, help = "validate files provided over standard input")]
    pub stdin: bool,
    #[arg(short = 'l', long = "schema-location", value_name = "PATH", help = "custom validation schema file (JSON or YAML)")]
    pub schema_location: Option<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, help = "Directory to start config discovery from (default: current dir)")]
    pub repo_root: Option<String>,
    #[arg(value_name = "FILE", help = "Entity files or glob patterns")]
    pub files: Vec<String>,
}

impl Cli {
    pub fn overrides(&self) -> crate::config::CliOverrides {
        crate::config::CliOverrides {
            repo_root: self.repo_root.clone(),
            quiet: self.quiet,
            schema_location: self.schema_location.clone(),
            output: self.output.clone(),
        }
    }
}
