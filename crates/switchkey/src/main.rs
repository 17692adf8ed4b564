//! Binary entrypoint for the switchkey background utility.

use std::{path::PathBuf, process};

use clap::{Parser, Subcommand};
use config::Store;

/// macOS runtime: event tap, dispatcher, config watcher, signals.
#[cfg(target_os = "macos")]
mod run;

#[derive(Parser, Debug)]
#[command(
    name = "switchkey",
    about = "Hotkey-driven application switcher for macOS",
    version
)]
/// Command-line interface for the `switchkey` binary.
struct Cli {
    /// Optional subcommand.
    #[command(subcommand)]
    command: Option<Command>,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,

    /// Optional path to the config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load and validate the configuration then exit.
    Check {
        /// Path to the configuration file to check (defaults to
        /// ~/.config/switchkey/config.toml)
        path: Option<PathBuf>,

        /// Dump the parsed configuration as JSON to stdout
        #[arg(long)]
        dump: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log);

    match cli.command {
        Some(Command::Check { path, dump }) => check(path.or(cli.config), dump),
        None => serve(cli.config).await,
    }
}

/// Strict load of the config: parse failures are errors here, not
/// something to paper over with defaults.
fn check(path: Option<PathBuf>, dump: bool) {
    let store = Store::new(path);
    match store.load_strict() {
        Ok(cfg) => {
            let cfg = cfg.normalized();
            println!(
                "{}: ok ({} mappings)",
                store.path().display(),
                cfg.mappings.len()
            );
            if dump {
                match serde_json::to_string_pretty(&cfg) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("error: cannot serialize configuration: {e}");
                        process::exit(1);
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(target_os = "macos")]
async fn serve(config: Option<PathBuf>) {
    if let Err(e) = run::run(Store::new(config)).await {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

#[cfg(not(target_os = "macos"))]
async fn serve(_config: Option<PathBuf>) {
    eprintln!("switchkey only runs on macOS; `switchkey check` works anywhere");
    process::exit(2);
}
