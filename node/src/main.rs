// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # DocSeal Node
//!
//! Entry point for the `docseal-node` binary. Parses CLI arguments,
//! initializes logging and metrics, opens the document store, and serves
//! the HTTP API.
//!
//! The binary supports four subcommands:
//!
//! - `run`     — serve the API and metrics endpoints
//! - `commit`  — print a file's content digest and commitment
//! - `prove`   — print a proof submission for a stored document
//! - `version` — print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::rngs::OsRng;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;

use docseal_protocol::canonical::{content_digest, ContentDigest, DefaultExtractor, MediaType};
use docseal_protocol::clock::SystemClock;
use docseal_protocol::config::{ProtocolConfig, NORMALIZATION_STRATEGY, PROTOCOL_VERSION};
use docseal_protocol::document::Ingestor;
use docseal_protocol::storage::{DocumentStore, MemoryStore, SledStore};
use docseal_protocol::verification::{ProofSubmission, VerificationService};
use docseal_protocol::zkp::{derive_commitment, prove};

use cli::{Commands, DocSealCli};
use logging::LogFormat;
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DocSealCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Commit(args) => commit_file(args),
        Commands::Prove(args) => prove_file(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the node: API server and metrics endpoint.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        logging::DEFAULT_FILTER,
        LogFormat::from_str_lossy(&args.log_format),
    );

    tracing::info!(
        port = args.port,
        metrics_port = args.metrics_port,
        in_memory = args.in_memory,
        "starting docseal-node"
    );

    // --- Document store ---
    let store: Arc<dyn DocumentStore> = if args.in_memory {
        tracing::warn!("using in-memory store, documents will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        let db_path = args.data_dir.join("db");
        std::fs::create_dir_all(&db_path).with_context(|| {
            format!("failed to create database directory: {}", db_path.display())
        })?;
        let store = SledStore::open(&db_path)
            .with_context(|| format!("failed to open database at {}", db_path.display()))?;
        tracing::info!(
            path = %db_path.display(),
            documents = store.document_count(),
            "database opened"
        );
        Arc::new(store)
    };

    // --- Protocol configuration ---
    let config = match args.signing_secret.as_deref() {
        Some(secret) if !secret.is_empty() => {
            ProtocolConfig::default().with_signing_secret(secret)
        }
        _ => ProtocolConfig::default(),
    };
    if config.uses_default_secret() {
        tracing::warn!("DOCUMENT_SIGNING_SECRET is not set, signing with the development secret");
    }

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new());

    // --- Application state ---
    let clock = Arc::new(SystemClock);
    let app_state = api::AppState {
        version: format!(
            "{} (protocol {})",
            env!("CARGO_PKG_VERSION"),
            PROTOCOL_VERSION,
        ),
        service: Arc::new(VerificationService::new(
            Arc::clone(&store),
            clock.clone(),
            config.clone(),
        )),
        ingestor: Arc::new(Ingestor::new(
            Arc::new(DefaultExtractor),
            store,
            clock,
            config,
        )),
        metrics: Arc::clone(&node_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("docseal-node stopped");
    Ok(())
}

/// Output of the `commit` subcommand.
#[derive(Serialize)]
struct CommitOutput {
    file: String,
    media_type: String,
    normalization_strategy: &'static str,
    digest: String,
    zk_commitment: String,
}

/// Prints the canonical digest and commitment of a file as JSON.
fn commit_file(args: cli::CommitArgs) -> Result<()> {
    let media_type = resolve_media_type(&args.file, args.media_type.as_deref());
    let digest = read_digest(&args.file, &media_type)?;

    let output = CommitOutput {
        file: args.file.display().to_string(),
        media_type: media_type.to_string(),
        normalization_strategy: NORMALIZATION_STRATEGY,
        digest: digest.to_hex(),
        zk_commitment: derive_commitment(&digest).to_hex(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Prints a proof submission for `POST /document/:id/zk-verify` as JSON.
fn prove_file(args: cli::ProveArgs) -> Result<()> {
    let media_type = resolve_media_type(&args.file, args.media_type.as_deref());
    let digest = read_digest(&args.file, &media_type)?;

    let context = args.context.unwrap_or_default();
    let submission = ProofSubmission {
        proof: prove(&digest, &args.document_id, &context, &mut OsRng),
        context: (!context.is_empty()).then_some(context),
    };
    println!("{}", serde_json::to_string_pretty(&submission)?);
    Ok(())
}

fn resolve_media_type(file: &Path, explicit: Option<&str>) -> MediaType {
    match explicit {
        Some(mime) => MediaType::from_mime(mime),
        None => MediaType::from_path(file),
    }
}

/// Reads a file and runs it through extraction and canonicalization.
fn read_digest(file: &Path, media_type: &MediaType) -> Result<ContentDigest> {
    let bytes =
        std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    match content_digest(&DefaultExtractor, &bytes, media_type) {
        Some(digest) => Ok(digest),
        None => bail!(
            "no text could be extracted from {} ({}); it cannot be committed to",
            file.display(),
            media_type
        ),
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("docseal-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol     {}", PROTOCOL_VERSION);
    println!("rustc        {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
