// ABOUTME: Command module aggregator for the stagepush CLI.
// ABOUTME: Re-exports the deploy and status command handlers.

mod deploy;
mod status;

pub use deploy::deploy;
pub use status::status;
