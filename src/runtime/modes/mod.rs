//! Mode routing
//!
//! This module provides unified entry points for different execution modes:
//! - Server mode (HTTP server)
//! - CLI mode (Command-line interface)
//!
//! The mode selection is based on the parsed subcommand and feature flags.

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "server")]
pub use server::run_server;

#[cfg(feature = "cli")]
pub use cli::run_cli;

use crate::cli::Cli;

/// Mode detection result
#[derive(Debug, PartialEq)]
pub enum Mode {
    #[cfg(feature = "server")]
    Server,
    #[cfg(feature = "cli")]
    Cli,
    Unknown,
}

/// Detect which mode to run based on the parsed command line
///
/// # Mode Detection Logic
/// 1. If a subcommand is given and CLI feature is enabled -> CLI mode
/// 2. If server feature is enabled -> Server mode (default)
/// 3. Otherwise -> Unknown (no features enabled)
pub fn detect_mode(cli: &Cli) -> Mode {
    #[cfg(feature = "cli")]
    if cli.command.is_some() {
        return Mode::Cli;
    }
    #[cfg(not(feature = "cli"))]
    let _ = cli;

    #[cfg(feature = "server")]
    return Mode::Server;

    #[cfg(not(feature = "server"))]
    Mode::Unknown
}

#[cfg(all(test, feature = "server", feature = "cli"))]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_detect_mode() {
        let server = Cli::try_parse_from(["salatlink"]).unwrap();
        assert_eq!(detect_mode(&server), Mode::Server);

        let cli = Cli::try_parse_from(["salatlink", "hadith"]).unwrap();
        assert_eq!(detect_mode(&cli), Mode::Cli);
    }
}
