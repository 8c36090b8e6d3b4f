#![warn(missing_docs)]

//! Shared logging helpers and CLI argument definitions for the dials workspace.
//!
//! Binaries flatten [`LogArgs`] into their argument parser and call [`init`]
//! once at startup. Filter precedence is an explicit `--log-filter`, then the
//! level flags scoped to our crates, then `RUST_LOG`, then crate-scoped `info`.

use std::{env, io};

use clap::Args;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

/// Logging controls for CLI apps.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Set global log level to trace (our crates only)
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set global log level to debug (our crates only)
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single global log level for our crates (error|warn|info|debug|trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides other flags)
    /// e.g. "dials_store=trace,dials=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl LogArgs {
    /// Filter spec for these arguments, consulting `RUST_LOG` as a fallback.
    pub fn spec(&self) -> String {
        compute_spec(
            self.trace,
            self.debug,
            self.log_level.as_deref(),
            self.log_filter.as_deref(),
        )
    }
}

/// List of crate targets that constitute "our" logs.
pub fn our_crates() -> &'static [&'static str] {
    &["dials", "dials_store", "dials_schema", "logging"]
}

/// Build a filter directive string that sets the same `level` for all of our crates.
pub fn level_spec_for(level: &str) -> String {
    let lvl = level.to_ascii_lowercase();
    our_crates()
        .iter()
        .map(|t| format!("{}={}", t, lvl))
        .collect::<Vec<_>>()
        .join(",")
}

/// Compute the final filter spec string with precedence:
/// - `log_filter`
/// - `trace`/`debug`/`log_level` (crate-scoped)
/// - `RUST_LOG` env
/// - default to crate-scoped `info`
pub fn compute_spec(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
) -> String {
    spec_with_env(
        trace,
        debug,
        log_level,
        log_filter,
        env::var("RUST_LOG").ok().as_deref(),
    )
}

/// [`compute_spec`] with the environment value passed in.
fn spec_with_env(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
    rust_log: Option<&str>,
) -> String {
    if let Some(spec) = log_filter {
        return spec.to_string();
    }
    if trace {
        return level_spec_for("trace");
    }
    if debug {
        return level_spec_for("debug");
    }
    if let Some(lvl) = log_level {
        return level_spec_for(lvl);
    }
    match rust_log {
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => level_spec_for("info"),
    }
}

/// Create an `EnvFilter` from a spec string.
pub fn env_filter_from_spec(spec: &str) -> EnvFilter {
    EnvFilter::new(spec)
}

/// Install a compact stderr subscriber filtered by `args`.
///
/// A subscriber installed earlier (e.g. by a test harness) is left in place.
pub fn init(args: &LogArgs) {
    let filter = env_filter_from_spec(&args.spec());
    registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).without_time())
        .try_init()
        .ok();
}
