// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the deploy and status subcommands and global output flags.

use clap::{Parser, Subcommand};
use stagepush::output::OutputMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stagepush")]
#[command(about = "Upload a build to partner hosting and publish it as the stage version")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (defaults to github inside GitHub Actions, normal elsewhere)
    #[arg(long, value_enum, global = true)]
    pub output: Option<OutputMode>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload the dist directory and point the stage index at this commit
    Deploy {
        /// Workspace root holding the dist directory (overrides GITHUB_WORKSPACE)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// App name (overrides INPUT_APP_NAME)
        #[arg(short, long)]
        app_name: Option<String>,

        /// Ask the partner to update the app route when publishing the stage index
        #[arg(long)]
        update_route: bool,
    },

    /// Show the versions recorded in the published stage index
    Status {
        /// App name (overrides INPUT_APP_NAME)
        #[arg(short, long)]
        app_name: Option<String>,
    },
}
