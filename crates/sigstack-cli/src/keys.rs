//! `keygen`: create an Ed25519 signing key as a private JWK.

use std::io::Write;

use clap::Args;
use sigstack_crypto::{Ed25519KeyPair, Jwk};

use crate::io::write_json;

/// Arguments for the `keygen` subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Key identifier to record in the JWK.
    #[arg(long)]
    pub kid: Option<String>,
}

/// Print a freshly generated private JWK.
///
/// The output contains the private key. Publish only its public part,
/// e.g. the `x` member, in a registry or `jku` key set.
pub fn run_keygen(args: &KeygenArgs, out: &mut dyn Write) -> anyhow::Result<u8> {
    let keypair = Ed25519KeyPair::generate();
    let jwk = Jwk::from_keypair(&keypair, args.kid.clone());
    tracing::info!(thumbprint = %jwk.thumbprint()?, "generated signing key");
    write_json(out, &jwk)?;
    Ok(0)
}
