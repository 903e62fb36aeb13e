//! Command-line interface for gaswatch.

mod commands;

use clap::{Parser, Subcommand};

/// gaswatch - home gas monitoring backend
#[derive(Parser)]
#[command(name = "gaswatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP API (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create a default config.toml in the working directory
    #[command(alias = "--init")]
    Init,

    /// Load and validate the configuration, then print a summary
    #[command(alias = "check")]
    CheckConfig,
}

impl Cli {
    #[must_use]
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::try_parse_from(["gaswatch"]).unwrap();
        assert_eq!(cli.command(), Commands::Serve);
    }

    #[test]
    fn test_subcommands_parse() {
        let cli = Cli::try_parse_from(["gaswatch", "check-config"]).unwrap();
        assert_eq!(cli.command(), Commands::CheckConfig);

        let cli = Cli::try_parse_from(["gaswatch", "init"]).unwrap();
        assert_eq!(cli.command(), Commands::Init);
    }
}
