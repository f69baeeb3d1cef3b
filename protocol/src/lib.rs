// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # DocSeal Protocol — Core Library
//!
//! DocSeal issues a publicly verifiable attestation that a document's
//! *canonical content* matches a value fixed when the document was ingested,
//! and lets a holder prove they know that content's fingerprint without ever
//! handing it over.
//!
//! The moving parts, leaf first:
//!
//! - **canonical** — text extraction, Unicode canonicalization, content digest.
//! - **zkp** — secp256k1 commitment to the digest, Schnorr prover and verifier.
//! - **crypto** — SHA-256 helpers and the HMAC integrity signer.
//! - **payload** — the verification payload record, its canonical encoding
//!   and the QR code rendering.
//! - **storage** — the document store contract plus in-memory and sled adapters.
//! - **document** — document ids and the ingestion pipeline.
//! - **verification** — the orchestrator that builds, caches and self-heals
//!   verification payloads.
//! - **config** — protocol constants and process-wide configuration.
//!
//! ## Ground rules
//!
//! 1. Every primitive below `verification` is pure. Configuration is read
//!    once at startup and never mutated.
//! 2. Proof verification answers with a boolean. Malformed proofs are
//!    expected adversarial input, not exceptions.
//! 3. The signature is as trustworthy as the signing secret. Rotate it and
//!    every payload gets re-signed on its next read.

pub mod canonical;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod document;
pub mod error;
pub mod payload;
pub mod storage;
pub mod verification;
pub mod zkp;

pub use error::{DocSealError, DocSealResult};
