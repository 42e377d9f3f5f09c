//! # Sign Subcommand
//!
//! Signs a document with a key file and writes the signed document to
//! stdout or `--output`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use sigstack::{sign, SignHeader, SignOptions, SignerInfo};
use sigstack_crypto::KeyMaterial;

use crate::io::{read_document, read_text, write_json};

/// Arguments for the `sign` subcommand.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// JSON document, or `-` for stdin.
    pub file: PathBuf,

    /// Private key: a JWK file, or a file holding a hex or base64 seed.
    #[arg(long)]
    pub key: PathBuf,

    /// Signer name recorded in the token.
    #[arg(long)]
    pub signer_name: Option<String>,

    /// Signer homepage recorded in the token. Requires `--signer-name`.
    #[arg(long, requires = "signer_name")]
    pub signer_url: Option<String>,

    /// Signature type recorded in the token, e.g. `transcription`.
    #[arg(long = "type")]
    pub signature_type: Option<String>,

    /// URL of a JWK set holding the public key. Requires `--kid`.
    #[arg(long, requires = "kid")]
    pub jku: Option<String>,

    /// Key identifier for the header.
    #[arg(long)]
    pub kid: Option<String>,

    /// Write the signed document here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Sign a document.
pub fn run_sign(args: &SignArgs, out: &mut dyn Write) -> anyhow::Result<u8> {
    let doc = read_document(&args.file)?;
    let key = KeyMaterial::Text(read_text(&args.key)?);

    let options = SignOptions {
        signer: args.signer_name.as_ref().map(|name| SignerInfo {
            name: name.clone(),
            url: args.signer_url.clone(),
        }),
        signature_type: args.signature_type.clone(),
        header: SignHeader {
            jku: args.jku.clone(),
            kid: args.kid.clone(),
            ..SignHeader::default()
        },
        ..SignOptions::default()
    };

    let signed = sign(&doc, Some(&key), &options).context("signing failed")?;

    match &args.output {
        Some(path) => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_json(&mut file, &signed)?;
            tracing::info!(path = %path.display(), "wrote signed document");
        }
        None => write_json(out, &signed)?,
    }
    Ok(0)
}
