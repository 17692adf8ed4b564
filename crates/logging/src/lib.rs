//! Shared logging helpers and CLI argument definitions for switchkey.
//!
//! Centralizes how the binary turns `--trace` / `--debug` / `--log-level` /
//! `--log-filter` into a tracing filter scoped to our own crates, and
//! installs the subscriber.

use std::env;

use clap::Args;
use tracing_subscriber::EnvFilter;

/// Logging controls for CLI apps.
#[derive(Debug, Clone, Args)]
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

    /// Set an explicit tracing filter directive (overrides other flags),
    /// e.g. "switchkey_engine=trace,config=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

/// List of crate targets that constitute "our" logs.
pub fn our_crates() -> &'static [&'static str] {
    &[
        "switchkey",
        "switchkey_engine",
        "config",
        "keyspec",
        "logging",
        "mac_appops",
    ]
}

/// Build a filter directive string that sets the same `level` for all of
/// our crates.
pub fn level_spec_for(level: &str) -> String {
    let lvl = level.to_ascii_lowercase();
    let parts: Vec<String> = our_crates()
        .iter()
        .map(|t| format!("{}={}", t, lvl))
        .collect();
    parts.join(",")
}

/// Compute the final filter spec string with precedence:
/// - `log_filter`
/// - `trace`/`debug`/`log_level` (crate-scoped)
/// - `RUST_LOG` env
/// - default to crate-scoped `info`
pub fn compute_spec(args: &LogArgs) -> String {
    if let Some(spec) = args.log_filter.as_deref() {
        return spec.to_string();
    }
    if args.trace {
        return level_spec_for("trace");
    }
    if args.debug {
        return level_spec_for("debug");
    }
    if let Some(lvl) = args.log_level.as_deref() {
        return level_spec_for(lvl);
    }
    if let Ok(spec) = env::var("RUST_LOG") {
        return spec;
    }
    level_spec_for("info")
}

/// Build an `EnvFilter` from a spec string, falling back to `info` if the
/// spec fails to parse.
pub fn env_filter_from_spec(spec: &str) -> EnvFilter {
    EnvFilter::try_new(spec).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber: env filter plus compact output without
/// timestamps.
pub fn init(args: &LogArgs) {
    let spec = compute_spec(args);
    let filter = env_filter_from_spec(&spec);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .without_time()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(
        trace: bool,
        debug: bool,
        log_level: Option<&str>,
        log_filter: Option<&str>,
    ) -> LogArgs {
        LogArgs {
            trace,
            debug,
            log_level: log_level.map(str::to_string),
            log_filter: log_filter.map(str::to_string),
        }
    }

    #[test]
    fn explicit_filter_wins() {
        let spec = compute_spec(&args(true, false, Some("warn"), Some("config=trace")));
        assert_eq!(spec, "config=trace");
    }

    #[test]
    fn level_spec_covers_all_crates() {
        let spec = level_spec_for("debug");
        for t in our_crates() {
            assert!(spec.contains(&format!("{}=debug", t)));
        }
    }

    #[test]
    fn bad_spec_falls_back() {
        // Should not panic; just produces a usable filter.
        let _ = env_filter_from_spec("not==valid==");
    }
}
