use clap::Parser;
use dirs::config_dir;
use env_logger::Builder;
use log::LevelFilter;
use std::fs::OpenOptions;
use stepbuild::cli::Cli;

/** Entry point for the stepbuild command-line client
 *
 * # Process Flow
 * 1. Initialize file logging
 * 2. Parse command line arguments using Clap
 * 3. Execute the requested command
 * 4. Report errors on stderr and exit non-zero
 *
 * # Example
 * ```bash
 * stepbuild compile --cc gcc -o build/app main.c util.c --flag=-Wall --scan
 * stepbuild stale -o build/app main.c util.c --scan
 * ```
 */
#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = cli.execute().await {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        for failure in e.failures() {
            eprintln!("  {}", failure);
        }
        std::process::exit(1);
    }
}

/** Initializes logging into the platform config directory
 *
 * # Directory Structure
 * - Linux: `~/.config/stepbuild/stepbuild.log`
 * - macOS: `~/Library/Application Support/stepbuild/stepbuild.log`
 * - Windows: `%APPDATA%\stepbuild\stepbuild.log`
 *
 * Falls back to stderr when the log file cannot be opened. `RUST_LOG`
 * overrides the default `info` level.
 */
fn init_logging() {
    let log_file = get_log_file_path();

    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Info).parse_default_env();

    if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_file) {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    log::info!("stepbuild started");
}

fn get_log_file_path() -> std::path::PathBuf {
    if let Some(config_dir) = config_dir() {
        config_dir.join("stepbuild").join("stepbuild.log")
    } else {
        std::env::current_dir()
            .map(|p| p.join("stepbuild.log"))
            .unwrap_or_else(|_| "stepbuild.log".into())
    }
}
