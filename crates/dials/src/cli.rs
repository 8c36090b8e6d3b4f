//! Command-line interface definitions for dials.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `dials` binary.
#[derive(Parser, Debug)]
#[command(
    name = "dials",
    about = "Inspect control-panel schemas and the values they mount",
    version
)]
pub struct Cli {
    /// Logging controls shared across dials binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Optional store configuration file (RON).
    #[arg(long, global = true, value_name = "PATH")]
    pub store_config: Option<PathBuf>,

    /// What to do with the schema.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the flattened input paths of a schema in display order.
    Paths(SchemaArgs),
    /// Mount a schema, apply writes, and print the resulting values.
    Values(ValuesArgs),
}

/// Schema location shared by every command.
#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Schema file in RON syntax.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Wrap the schema in a folder with this name.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
}

/// Arguments for the `values` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ValuesArgs {
    /// Schema to mount.
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Write a value before printing, e.g. `--set camera.fov=60`. Values are
    /// RON literals; anything that does not parse is taken as text.
    #[arg(long = "set", value_name = "PATH=VALUE")]
    pub sets: Vec<String>,

    /// Print the values as a JSON object.
    #[arg(long)]
    pub json: bool,
}
