//! # Verify Subcommand
//!
//! Prints the verification report as JSON. Exit status is `0` when the
//! report passes the policy and [`EXIT_REJECTED`] when it does not; hard
//! errors (unreadable input, no signature, registry outage) are reported by
//! the caller.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use sigstack::{Verifier, VerifyOptions};
use sigstack_trust::{HttpKeyResolver, TrustConfig, TrustedKeyCache};
use url::Url;

use crate::io::{read_document, write_json};

/// Exit status when a signature fails the verification policy.
pub const EXIT_REJECTED: u8 = 2;

/// Arguments for the `verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Signed JSON document, or `-` for stdin.
    pub file: PathBuf,

    /// Accept valid, unmodified signatures from keys not on the trusted list.
    #[arg(long)]
    pub allow_untrusted: bool,

    /// Trusted-list URL. Repeatable; replaces the configured registries.
    #[arg(long = "registry", value_name = "URL")]
    pub registries: Vec<Url>,

    /// Verify every signature on the stack, most recent first.
    #[arg(long)]
    pub chain: bool,
}

/// Verify a document's signature, or its whole stack with `--chain`.
pub async fn run_verify(args: &VerifyArgs, out: &mut dyn Write) -> anyhow::Result<u8> {
    let doc = read_document(&args.file)?;

    let mut config = TrustConfig::from_env()?;
    if !args.registries.is_empty() {
        config.registry_urls = args.registries.clone();
    }
    let verifier = Verifier::with_parts(
        HttpKeyResolver::from_config(&config)?,
        Arc::new(TrustedKeyCache::from_config(&config)?),
    );
    let options = VerifyOptions {
        allow_untrusted: args.allow_untrusted,
        ..VerifyOptions::default()
    };

    let accepted = if args.chain {
        let reports = verifier.verify_chain(&doc, &options).await?;
        write_json(out, &reports)?;
        reports.iter().all(|r| r.is_acceptable(&options))
    } else {
        let report = verifier.verify(&doc, &options).await?;
        write_json(out, &report)?;
        report.is_acceptable(&options)
    };

    if accepted {
        Ok(0)
    } else {
        tracing::warn!("signature rejected by verification policy");
        Ok(EXIT_REJECTED)
    }
}
