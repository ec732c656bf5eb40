//! Command-line interface for the yaml-readme binary.
//!
//! Renders a README from YAML metadata files and a template, writing the
//! result to stdout. Diagnostics go to stderr through `tracing`.

use std::{
    io::{self, Write},
    path::PathBuf,
    process,
    sync::Arc
};

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;
use yaml_readme::{
    DEFAULT_PATTERN, DEFAULT_TEMPLATE_PATH, Error, FUNCTION_NAMES, OctocrabApi, RenderOptions,
    TEMPLATE_VARIABLES, generate_readme, resolve_token
};

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Top-level CLI options parsed from user input.
#[derive(Debug, Parser)]
#[command(
    name = "yaml-readme",
    version,
    about = "A helper to generate a README file from a template and YAML metadata"
)]
struct Cli {
    /// Glob pattern selecting the metadata files.
    #[arg(short = 'p', long = "pattern", value_name = "GLOB", default_value = DEFAULT_PATTERN)]
    pattern: String,

    /// Template file to render.
    #[arg(
        short = 't',
        long = "template",
        value_name = "PATH",
        default_value = DEFAULT_TEMPLATE_PATH
    )]
    template: PathBuf,

    /// Include a generated-by notice at the top of the output.
    #[arg(
        long = "include-header",
        value_name = "BOOL",
        default_value_t = true,
        action = ArgAction::Set
    )]
    include_header: bool,

    /// Sort records descending by a field, or ascending with a leading '!'
    /// (for example `--sort-by '!year'`).
    #[arg(long = "sort-by", value_name = "FIELD", default_value = "")]
    sort_by: String,

    /// Group records by a field; templates then receive `groups`.
    #[arg(long = "group-by", value_name = "FIELD", default_value = "")]
    group_by: String,

    /// Print all template functions and exit.
    #[arg(long = "print-functions", action = ArgAction::SetTrue)]
    print_functions: bool,

    /// Print all template variables and exit.
    #[arg(long = "print-variables", action = ArgAction::SetTrue)]
    print_variables: bool,

    /// Token used for GitHub API requests; `GH_TOKEN` is used when unset.
    #[arg(long = "github-token", env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>
}

impl Cli {
    fn options(&self) -> RenderOptions {
        RenderOptions {
            pattern: self.pattern.clone(),
            template: self.template.clone(),
            include_header: self.include_header,
            ..RenderOptions::default()
        }
        .with_sort_by(&self.sort_by)
        .with_group_by(&self.group_by)
    }
}

/// Entry point that reports errors and sets the appropriate exit status.
fn main() {
    init_tracing();

    if let Err(error) = run(Cli::parse()) {
        eprintln!("{}", error.to_display_string());
        process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates fatal generation errors and stdout write failures.
fn run(cli: Cli) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if cli.print_functions {
        return write_lines(&mut handle, FUNCTION_NAMES);
    }
    if cli.print_variables {
        return write_lines(&mut handle, TEMPLATE_VARIABLES);
    }

    let options = cli.options();
    let api = OctocrabApi::new(resolve_token(cli.github_token))?;
    let readme = generate_readme(&options, Arc::new(api))?;

    handle
        .write_all(readme.as_bytes())
        .and_then(|()| handle.flush())
        .map_err(|source| Error::Output {
            source
        })
}

fn write_lines<W: Write>(writer: &mut W, lines: &[&str]) -> Result<(), Error> {
    for line in lines {
        writeln!(writer, "{line}").map_err(|source| Error::Output {
            source
        })?;
    }
    Ok(())
}
