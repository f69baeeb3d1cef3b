//! Terminal walkthrough of a document's DocSeal lifecycle.
//!
//! Ingests an invoice, issues its verification payload, decodes what the QR
//! code would carry, then has an honest holder and an impostor each submit
//! a zero-knowledge proof.
//!
//! Run with:
//!   cargo run --example demo --release

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::OsRng;

use docseal_protocol::canonical::{canonicalize, digest, DefaultExtractor, MediaType};
use docseal_protocol::clock::SystemClock;
use docseal_protocol::config::ProtocolConfig;
use docseal_protocol::document::Ingestor;
use docseal_protocol::payload::decode;
use docseal_protocol::storage::MemoryStore;
use docseal_protocol::verification::{ProofSubmission, VerificationService};
use docseal_protocol::zkp::prove;

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn step(n: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}[{n}] {title}{RESET}");
}

fn kv(key: &str, value: &str) {
    println!("    {DIM}{key:<24}{RESET} {value}");
}

fn verdict(ok: bool, elapsed_us: u128) {
    if ok {
        println!("    {GREEN}{BOLD}VALID{RESET}   {DIM}({elapsed_us} µs){RESET}");
    } else {
        println!("    {RED}{BOLD}INVALID{RESET} {DIM}({elapsed_us} µs){RESET}");
    }
}

fn main() {
    println!("{BOLD}DocSeal  |  secp256k1 commitments + Schnorr/Fiat–Shamir + HMAC-SHA256{RESET}");

    let store = Arc::new(MemoryStore::new());
    let config = ProtocolConfig::default().with_signing_secret("demo-secret");
    let ingestor = Ingestor::new(
        Arc::new(DefaultExtractor),
        store.clone(),
        Arc::new(SystemClock),
        config.clone(),
    );
    let service = VerificationService::new(store, Arc::new(SystemClock), config);

    // -- 1. Ingest -----------------------------------------------------------
    step(1, "Ingest an invoice");
    let original = "ACME Corp\nInvoice   TOTAL:  100.00 USD\n";
    let record = ingestor
        .ingest(original.as_bytes(), &MediaType::PlainText, "acme-invoice.txt")
        .expect("ingestion");
    kv("document id", &record.id);
    kv("file hash", &record.file_hash);
    kv("canonical text", &canonicalize(original));
    kv("commitment", record.zk_commitment.as_deref().unwrap_or("-"));

    // -- 2. Issue ------------------------------------------------------------
    step(2, "Issue the verification payload");
    let report = service.build_payload(&record.id).expect("payload");
    kv("issued at", &report.payload.issued_at);
    kv("checksum", &report.payload.checksum);
    kv("signature", &report.payload.signature);
    kv("healed fields", &report.healed.join(", "));
    kv("qr png", &format!("{} base64 chars", report.payload.qr_png.len()));

    // -- 3. Scan -------------------------------------------------------------
    step(3, "Scan the QR code");
    let scanned = decode(&report.payload.qr_payload).expect("decode");
    let authentic = service.signer().verify(&scanned.signable(), &scanned.signature);
    kv("scanned id", &scanned.id);
    kv("signature checks out", &authentic.to_string());

    // -- 4. Prove ------------------------------------------------------------
    step(4, "Holder proves knowledge of the content");
    let held = digest(&canonicalize("acme corp invoice total: 100.00 usd")).expect("digest");
    let submission = ProofSubmission {
        proof: prove(&held, &record.id, "front-desk", &mut OsRng),
        context: Some("front-desk".into()),
    };
    let start = Instant::now();
    let honest = service
        .verify_document_proof(&record.id, &submission)
        .expect("verify");
    verdict(honest.is_valid(), start.elapsed().as_micros());

    // -- 5. Impostor ---------------------------------------------------------
    step(5, "Impostor proves an edited invoice");
    let edited = digest(&canonicalize("ACME Corp\nInvoice TOTAL: 10.00 USD")).expect("digest");
    let forged = ProofSubmission {
        proof: prove(&edited, &record.id, "front-desk", &mut OsRng),
        context: Some("front-desk".into()),
    };
    let start = Instant::now();
    let impostor = service
        .verify_document_proof(&record.id, &forged)
        .expect("verify");
    verdict(impostor.is_valid(), start.elapsed().as_micros());

    println!();
}
