mod cli_args;
mod state;

pub use cli_args::{CliArgs, CliCommand};
pub use state::{InitStateError, State};

use clap::Parser;

/// Entry point of the `yap` binary.
pub async fn run() -> miette::Result<()> {
    yap_diagnostics::enable_tracing_by_env();
    let CliArgs { command } = CliArgs::parse();
    match command.unwrap_or(CliCommand::Install) {
        CliCommand::Install => State::init()?.install().await?,
    }
    Ok(())
}
