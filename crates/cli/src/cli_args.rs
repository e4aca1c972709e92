use clap::{Parser, Subcommand};

/// Experimental package installer for the npm ecosystem.
#[derive(Debug, Parser)]
#[clap(name = "yap", version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: Option<CliCommand>,
}

/// Bare `yap` runs the install pipeline; `yap install` is the explicit
/// spelling of the same thing.
#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve, download, and link every dependency of `package.json`.
    Install,
}
