mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;

#[derive(Parser)]
#[command(
    name = "sheetcut",
    version,
    about = "Cuts audio clips for the rows of a sheet"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(
        long,
        env = "SHEETCUT_CONFIG",
        default_value = "sheetcut.toml",
        global = true
    )]
    config: PathBuf,

    /// Log level (error, warn, info, debug, trace), used when RUST_LOG is unset
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the sheet and process ready rows until interrupted
    Run(commands::run::RunArgs),
    /// Process one row now, optionally replacing some of its cells
    Manual {
        /// Row id (1-based position in the sheet)
        row_id: u32,
        /// Cell overrides as `field=value`
        overrides: Vec<String>,
    },
    /// Validate the configuration, the external tools and the data source
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init(&cli.log_level, cli.log_json);

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(&cli.config, args).await,
        Commands::Manual { row_id, overrides } => {
            commands::manual::execute(&cli.config, row_id, &overrides).await
        }
        Commands::Check => commands::check::execute(&cli.config).await,
    };

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "sheetcut",
            "--config",
            "/etc/sheetcut.toml",
            "run",
            "--restart-errors",
            "--once",
            "--interval",
            "30",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/etc/sheetcut.toml"));
        match cli.command {
            Commands::Run(args) => {
                assert!(args.restart_errors);
                assert!(!args.restart_in_progress);
                assert!(args.once);
                assert_eq!(args.interval, Some(30));
                assert_eq!(args.max_jobs, None);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_manual_overrides() {
        let cli = Cli::try_parse_from(["sheetcut", "manual", "4", "Start Time=1:30", "Song=Intro"])
            .unwrap();
        match cli.command {
            Commands::Manual { row_id, overrides } => {
                assert_eq!(row_id, 4);
                assert_eq!(overrides, vec!["Start Time=1:30", "Song=Intro"]);
            }
            _ => panic!("expected manual"),
        }
    }
}
