#![warn(missing_docs)]

//! Entry point for the `dials` binary.

mod cli;

use std::process;

use clap::Parser;
use dials::{
    Result, load_schema, load_store_config, mount_values, parse_assignment, render_paths,
    render_values,
};
use dials_store::Store;
use tracing::error;

use crate::cli::{Cli, Commands};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {}", err.pretty());
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and dispatch to the chosen subcommand.
fn run() -> Result<()> {
    let Cli {
        log,
        store_config,
        command,
    } = Cli::parse();
    logging::init(&log);

    match command {
        Commands::Paths(args) => {
            let input = load_schema(&args.file, args.name.as_deref())?;
            print!("{}", render_paths(&input)?);
        }
        Commands::Values(args) => {
            let config = load_store_config(store_config.as_deref())?;
            let input = load_schema(&args.schema.file, args.schema.name.as_deref())?;
            let sets = args
                .sets
                .iter()
                .map(String::as_str)
                .map(parse_assignment)
                .collect::<Result<Vec<_>>>()?;
            let store = Store::with_config(config);
            let values = mount_values(&store, &input, &sets)?;
            print!("{}", render_values(&values, args.json)?);
        }
    }
    Ok(())
}
