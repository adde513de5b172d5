//! Stencil command-line entry point.
//!
//! `stencil render` prints a rendered template; `stencil resolve` resolves a
//! whole variable file and prints the result.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use stencil_domain::VariableMap;
use stencil_infrastructure::{default_engine, load_settings, load_variables, to_json_stable, to_yaml};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "stencil", version)]
#[command(about = "Render {{ }} templates and resolve interdependent variables")]
struct Cli {
    /// Settings file (YAML, JSON or TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a template against a variable file
    Render {
        /// Template text, such as "Hello {{ name }}"
        template: String,

        /// Variables available to the template (YAML or JSON)
        #[arg(long, value_name = "FILE")]
        vars: Option<PathBuf>,
    },

    /// Resolve every variable in a file against the others
    Resolve {
        /// Variables to resolve (YAML or JSON)
        #[arg(long, value_name = "FILE")]
        vars: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = run(&cli)?;
    print!("{output}");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Executes a parsed command and returns what should be printed.
fn run(cli: &Cli) -> Result<String> {
    let settings = load_settings(cli.config.as_deref()).context("Failed to load settings")?;
    let engine = default_engine(settings);

    match &cli.command {
        Command::Render { template, vars } => {
            let vars = match vars {
                Some(path) => read_variables(path)?,
                None => VariableMap::new(),
            };
            let mut rendered = engine
                .render(template, &vars)
                .context("Failed to render template")?;
            rendered.push('\n');
            Ok(rendered)
        }
        Command::Resolve { vars, output } => {
            let vars = read_variables(vars)?;
            let resolved = engine
                .resolve_variables(&vars)
                .context("Failed to resolve variables")?;
            let text = match output {
                OutputFormat::Json => to_json_stable(&resolved)?,
                OutputFormat::Yaml => to_yaml(&resolved)?,
            };
            Ok(text)
        }
    }
}

fn read_variables(path: &Path) -> Result<VariableMap> {
    load_variables(path).with_context(|| format!("Failed to load variables from {}", path.display()))
}
