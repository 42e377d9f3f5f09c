//! # Document Subcommands
//!
//! `serialize`, `hash` and `pop`: offline inspection of a document.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use sigstack::{hash_document, pop_signature, serialize, HashOptions};

use crate::io::{read_document, write_json};

/// Arguments for the `serialize` subcommand.
#[derive(Args, Debug)]
pub struct SerializeArgs {
    /// JSON document, or `-` for stdin.
    pub file: PathBuf,
}

/// Arguments for the `hash` subcommand.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// JSON document, or `-` for stdin.
    pub file: PathBuf,

    /// Include `_id`, `_meta` and `_rev` in the hash.
    #[arg(long)]
    pub keep_reserved_keys: bool,
}

/// Arguments for the `pop` subcommand.
#[derive(Args, Debug)]
pub struct PopArgs {
    /// Signed JSON document, or `-` for stdin.
    pub file: PathBuf,
}

/// Print the canonical serialization of a document.
pub fn run_serialize(args: &SerializeArgs, out: &mut dyn Write) -> anyhow::Result<u8> {
    let doc = read_document(&args.file)?;
    writeln!(out, "{}", serialize(&doc))?;
    Ok(0)
}

/// Print the document's `HashInfo`.
pub fn run_hash(args: &HashArgs, out: &mut dyn Write) -> anyhow::Result<u8> {
    let doc = read_document(&args.file)?;
    let options = HashOptions {
        keep_reserved_keys: args.keep_reserved_keys,
        ..HashOptions::default()
    };
    write_json(out, &hash_document(&doc, &options))?;
    Ok(0)
}

/// Print the document with its most recent signature removed.
pub fn run_pop(args: &PopArgs, out: &mut dyn Write) -> anyhow::Result<u8> {
    let doc = read_document(&args.file)?;
    write_json(out, &pop_signature(&doc))?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc_file(value: &Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{value}").unwrap();
        file
    }

    #[test]
    fn serialize_prints_canonical_text() {
        let file = doc_file(&json!({"b": 2, "a": {"d": 1, "c": 0}}));
        let mut out = Vec::new();
        let code = run_serialize(&SerializeArgs { file: file.path().into() }, &mut out).unwrap();
        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "{\"a\":{\"c\":0,\"d\":1},\"b\":2}\n");
    }

    #[test]
    fn hash_respects_reserved_key_flag() {
        let file = doc_file(&json!({"_id": "x", "key1": "hello"}));
        let mut stripped = Vec::new();
        run_hash(
            &HashArgs { file: file.path().into(), keep_reserved_keys: false },
            &mut stripped,
        )
        .unwrap();
        let info: Value = serde_json::from_slice(&stripped).unwrap();
        assert_eq!(info["alg"], "SHA256");
        assert_eq!(
            info["hash"],
            "0aced6a895ea008233b8ec61e6164f4395d32fb2467e8d6c619c077637a2b000"
        );

        let mut kept = Vec::new();
        run_hash(
            &HashArgs { file: file.path().into(), keep_reserved_keys: true },
            &mut kept,
        )
        .unwrap();
        assert_ne!(stripped, kept);
    }

    #[test]
    fn pop_removes_top_signature() {
        let file = doc_file(&json!({"a": 1, "signatures": ["one", "two"]}));
        let mut out = Vec::new();
        run_pop(&PopArgs { file: file.path().into() }, &mut out).unwrap();
        let popped: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(popped, json!({"a": 1, "signatures": ["one"]}));
    }
}
