//! CLI entry point and command dispatch
//!
//! `run()` owns the full CLI lifecycle: parse arguments, initialize logging,
//! discover configuration, stand up the async runtime, dispatch the requested
//! command, and translate any error into an exit code. Library code never
//! calls `std::process::exit()`; only `main.rs` does, with the code returned
//! from here.

use clap::Parser;

use deckgen_config::{CliArgs, Config};
use deckgen_utils::error::DeckError;
use deckgen_utils::exit_codes::ExitCode;
use deckgen_utils::logging::init_tracing;

use super::args::{Cli, Commands};
use super::{commands, session};

/// Parse arguments, dispatch the command, and map errors to exit codes.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("✗ Failed to initialize logging: {e}");
        return Err(ExitCode::INTERNAL);
    }

    // Per-command output override only exists on `build`; everything else
    // flows through the global flags.
    let output_override = match &cli.command {
        Commands::Build { output, .. } => output.clone(),
        _ => None,
    };

    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        outline: cli.deck.clone(),
        provider: cli.provider.clone(),
        model: cli.model.clone(),
        image_model: cli.image_model.clone(),
        api_key_env: cli.api_key_env.clone(),
        base_url: cli.base_url.clone(),
        timeout_seconds: cli.timeout_seconds,
        concurrency: cli.concurrency,
        output: output_override,
        dry_run: cli.dry_run,
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(error) => {
            if let Some(deck_error) = error.downcast_ref::<DeckError>() {
                eprintln!("{}", deck_error.display_for_user());
                return Err(deck_error.to_exit_code());
            }
            eprintln!("✗ Configuration error: {error:#}");
            return Err(ExitCode::CLI_ARGS);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let operation = match &cli.command {
        Commands::Init { .. } => "init",
        Commands::Outline => "outline",
        Commands::Build { .. } => "build",
        Commands::Session => "session",
    };
    tracing::debug!(command = operation, "dispatching");

    let result = rt.block_on(async {
        match cli.command {
            Commands::Init { force } => commands::execute_init_command(force),
            Commands::Outline => commands::execute_outline_command(&config),
            Commands::Build { images, force, .. } => {
                commands::execute_build_command(&config, force, images).await
            }
            Commands::Session => session::execute_session_command(&config).await,
        }
    });

    if let Err(error) = result {
        if let Some(deck_error) = error.downcast_ref::<DeckError>() {
            eprintln!("{}", deck_error.display_for_user());
            return Err(deck_error.to_exit_code());
        }
        eprintln!("✗ Unexpected error: {error:#}");
        return Err(ExitCode::INTERNAL);
    }

    Ok(())
}
