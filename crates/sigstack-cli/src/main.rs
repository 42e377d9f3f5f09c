//! # sigstack CLI entry point
//!
//! Parses arguments and dispatches to the subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sigstack_cli::document::{run_hash, run_pop, run_serialize, HashArgs, PopArgs, SerializeArgs};
use sigstack_cli::keys::{run_keygen, KeygenArgs};
use sigstack_cli::signing::{run_sign, SignArgs};
use sigstack_cli::verification::{run_verify, VerifyArgs};

/// Stacked signatures for JSON documents.
///
/// Sign documents by appending JWS tokens to their `signatures` array and
/// verify the most recent one against a trusted-key registry.
#[derive(Parser, Debug)]
#[command(name = "sigstack", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 signing key as a private JWK.
    Keygen(KeygenArgs),

    /// Print the canonical serialization of a document.
    Serialize(SerializeArgs),

    /// Print the hash of a document.
    Hash(HashArgs),

    /// Append a signature to a document.
    Sign(SignArgs),

    /// Verify the most recent signature on a document.
    Verify(VerifyArgs),

    /// Remove the most recent signature from a document.
    Pop(PopArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    let result = match &cli.command {
        Commands::Keygen(args) => run_keygen(args, &mut stdout),
        Commands::Serialize(args) => run_serialize(args, &mut stdout),
        Commands::Hash(args) => run_hash(args, &mut stdout),
        Commands::Sign(args) => run_sign(args, &mut stdout),
        Commands::Verify(args) => run_verify(args, &mut stdout).await,
        Commands::Pop(args) => run_pop(args, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
