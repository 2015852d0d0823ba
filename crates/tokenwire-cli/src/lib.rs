//! # tokenwire-cli
//!
//! Command-line front end for [`tokenwire`]: mint Bearer, DPoP and N_A access
//! tokens, decode Authorization headers and JSON token responses, and parse or
//! build WWW-Authenticate challenges.
//!
//! ## Usage
//!
//! ```bash
//! # Mint a DPoP token with a refresh token
//! tokenwire generate --scheme dpop --lifetime 3600 --refresh
//!
//! # Print just the Authorization header value
//! tokenwire generate --encoding header
//!
//! # Decode a header, inferring the scheme
//! tokenwire header "DPoP Kz~8mXK1EalYznwH-LC-1fBAo.4Ljp~zsPE_NeO.gxU"
//!
//! # Decode a token endpoint response
//! curl -s ... | tokenwire response --format yaml
//!
//! # Build and parse challenges
//! tokenwire challenge build --scheme dpop --error invalid-token --algs ES256,PS256
//! tokenwire challenge parse 'Bearer realm="example", error="invalid_token"'
//! ```
//!
//! Settings come from an optional file (`--config` or `TOKENWIRE_CONFIG`) and
//! `TOKENWIRE_CODEC__*` environment variables; see [`settings`].

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod settings;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub use cli::Cli;
pub use commands::CommandExecutor;
pub use error::{CliError, CliResult};
pub use settings::Settings;

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let formatter = output::Formatter::new(cli.format, !cli.no_color);
    match try_run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.display_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Load settings and execute the parsed command
///
/// # Errors
/// Returns settings failures and command failures alike.
pub fn try_run(cli: Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let formatter = output::Formatter::new(cli.format, !cli.no_color);
    let executor = CommandExecutor::new(formatter, settings)?;
    executor.execute(cli.command)
}

/// Log to stderr so stdout stays parseable
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
