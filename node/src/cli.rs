//! # CLI Interface
//!
//! Defines the command-line argument structure for `docseal-node` using
//! `clap` derive. Supports four subcommands: `run`, `commit`, `prove`
//! and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DocSeal attestation node.
///
/// Serves the document attestation API (ingestion, signed verification
/// payloads, zero-knowledge proof checks) and exposes Prometheus metrics.
/// The `commit` and `prove` subcommands are the holder's side of the
/// protocol and never touch a store.
#[derive(Parser, Debug)]
#[command(
    name = "docseal-node",
    about = "DocSeal document attestation node",
    version,
    propagate_version = true
)]
pub struct DocSealCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the DocSeal node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API and metrics servers.
    Run(RunArgs),
    /// Print the canonical content digest and commitment of a file.
    Commit(CommitArgs),
    /// Prove knowledge of a file's content for a stored document id.
    Prove(ProveArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Port for the REST API.
    #[arg(long, env = "DOCSEAL_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "DOCSEAL_METRICS_PORT", default_value_t = 9090)]
    pub metrics_port: u16,

    /// Directory holding the document database.
    ///
    /// Created on first run if it does not exist.
    #[arg(long, short = 'd', env = "DOCSEAL_DATA_DIR", default_value = "./docseal-data")]
    pub data_dir: PathBuf,

    /// Keep documents in memory instead of on disk. Everything is lost on exit.
    #[arg(long)]
    pub in_memory: bool,

    /// Secret for HMAC payload signatures.
    ///
    /// Falls back to the well-known development secret when unset.
    /// **Never run production without it.**
    #[arg(long, env = "DOCUMENT_SIGNING_SECRET", hide_env_values = true)]
    pub signing_secret: Option<String>,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "DOCSEAL_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

/// Arguments for the `commit` subcommand.
#[derive(Parser, Debug)]
pub struct CommitArgs {
    /// The document to commit to.
    #[arg(long, short = 'f')]
    pub file: PathBuf,

    /// MIME type of the file. Guessed from the extension when omitted.
    #[arg(long)]
    pub media_type: Option<String>,
}

/// Arguments for the `prove` subcommand.
#[derive(Parser, Debug)]
pub struct ProveArgs {
    /// The holder's copy of the document.
    #[arg(long, short = 'f')]
    pub file: PathBuf,

    /// MIME type of the file. Guessed from the extension when omitted.
    #[arg(long)]
    pub media_type: Option<String>,

    /// Id of the stored document the proof is for, e.g. `INV-1234-5678`.
    #[arg(long)]
    pub document_id: String,

    /// Verifier-chosen context string bound into the challenge.
    #[arg(long)]
    pub context: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        DocSealCli::command().debug_assert();
    }

    #[test]
    fn prove_requires_document_id() {
        let parsed = DocSealCli::try_parse_from(["docseal-node", "prove", "--file", "a.pdf"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn prove_parses_optional_context() {
        let cli = DocSealCli::try_parse_from([
            "docseal-node",
            "prove",
            "-f",
            "invoice.txt",
            "--document-id",
            "INV-1234-5678",
            "--context",
            "front-desk",
        ])
        .unwrap();
        match cli.command {
            Commands::Prove(args) => {
                assert_eq!(args.document_id, "INV-1234-5678");
                assert_eq!(args.context.as_deref(), Some("front-desk"));
                assert!(args.media_type.is_none());
            }
            other => panic!("expected prove, got {other:?}"),
        }
    }
}
