// ABOUTME: Entry point for the stagepush CLI application.
// ABOUTME: Parses arguments, sets up logging and output, and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use stagepush::config::{InputOverrides, running_in_ci};
use stagepush::error::Result;
use stagepush::output::{Output, OutputMode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let in_ci = running_in_ci(|key| std::env::var(key).ok());
    let mode = cli.output.unwrap_or_else(|| OutputMode::detect(in_ci));
    let mut output = Output::new(mode);
    output.start_timer();

    if let Err(e) = run(cli, &output).await {
        tracing::debug!("command failed: {e:?}");
        output.error(&e.display_message(in_ci));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    match cli.command {
        Commands::Deploy {
            workspace,
            app_name,
            update_route,
        } => {
            let overrides = InputOverrides {
                app_name,
                workspace,
            };
            commands::deploy(&overrides, update_route, output).await
        }
        Commands::Status { app_name } => {
            let overrides = InputOverrides {
                app_name,
                workspace: None,
            };
            commands::status(&overrides, output).await
        }
    }
}
