use crate::pipeline::decode_object;
use crate::projection::{project_inbound, project_outbound};
use crate::resource::Resource;
use crate::rules::load_rule_set;
use crate::value::Value;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Command-line interface for rule files
#[derive(Parser, Debug)]
#[command(name = "crudrules")]
#[command(about = "Check rule files and run documents through the projectors", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a rule file (YAML or JSON)
    Check {
        /// Path to the rule file
        rules: PathBuf,
    },
    /// Project a JSON document through a rule file
    Project {
        /// Path to the rule file
        rules: PathBuf,

        /// API version the projection is scoped to
        #[arg(long, default_value = "1")]
        version: String,

        /// Projection direction
        #[arg(short, long, value_enum, default_value_t = ProjectDirection::Inbound)]
        direction: ProjectDirection,

        /// JSON document to project; stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProjectDirection {
    /// Wire payload into handler data
    Inbound,
    /// Handler data into wire payload
    Outbound,
}

/// Parses the process arguments and runs the command against stdout.
///
/// # Errors
///
/// Propagates any failure of the selected command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&cli, &mut out)
}

/// Runs a parsed command, writing its output to `out`.
///
/// # Errors
///
/// Fails when the rule file cannot be loaded or is invalid, when the input
/// cannot be read or decoded, or when inbound projection rejects the document.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Commands::Check { rules } => {
            let set = load_rule_set(rules)?;
            info!(path = %rules.display(), rules = set.len(), "Rule file is valid");
            writeln!(
                out,
                "{}: {} ({} rules) ok",
                rules.display(),
                set.resource().name(),
                set.len()
            )?;
        }
        Commands::Project {
            rules,
            version,
            direction,
            input,
        } => {
            let set = load_rule_set(rules)?;
            let bytes = read_input(input.as_deref())?;
            let projected = match direction {
                ProjectDirection::Inbound => {
                    let payload = decode_object(&bytes)?;
                    Value::Object(project_inbound(payload, &set, version)?)
                }
                ProjectDirection::Outbound => {
                    let document: serde_json::Value = serde_json::from_slice(&bytes)
                        .context("Failed to parse input document")?;
                    project_outbound(as_resource(Value::from(document)), &set, version)
                        .into_value()
                }
            };
            serde_json::to_writer_pretty(&mut *out, &projected)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read input {}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Objects become map resources, arrays become lists; anything else is opaque.
fn as_resource(value: Value) -> Resource {
    match value {
        Value::Object(map) => Resource::Map(map),
        Value::Array(items) => Resource::List(items.into_iter().map(as_resource).collect()),
        other => Resource::Value(other),
    }
}
