//! # sigstack-cli: Command-Line Interface
//!
//! Handlers for the `sigstack` binary. Each subcommand has a clap `Args`
//! struct and a `run_*` function that writes its result to the given
//! writer and returns the process exit code.
//!
//! ## Subcommands
//!
//! - `keygen`: new private JWK
//! - `serialize`: canonical text of a document
//! - `hash`: `HashInfo` of a document
//! - `sign`: append a signature
//! - `verify`: report on the top signature (or all, with `--chain`)
//! - `pop`: remove the top signature
//!
//! Logs go to stderr; stdout carries only results.

pub mod document;
pub mod io;
pub mod keys;
pub mod signing;
pub mod verification;
