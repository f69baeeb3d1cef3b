// Integrity signing and payload encoding benchmarks for DocSeal.
//
// Covers HMAC signing and verification of the signable field set, the
// canonical base64url payload encoding, QR rendering, and canonicalization
// of document text at a few sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use docseal_protocol::canonical::canonicalize;
use docseal_protocol::crypto::IntegritySigner;
use docseal_protocol::payload::{encode, render_code, SignableFields, SignedPayload};

fn fields() -> SignableFields {
    SignableFields {
        checksum: "3F9A0C1D22BE".into(),
        file_hash: "9f".repeat(32),
        id: "INV-1234-5678".into(),
        issued_at: "2026-05-01T09:00:00Z".into(),
        normalization_strategy: "unicode_nfkc_lowercase_whitespace_collapse".into(),
        zk_commitment: format!("02{}", "ab".repeat(32)),
    }
}

fn bench_sign(c: &mut Criterion) {
    let signer = IntegritySigner::new("bench-secret");
    let fields = fields();

    c.bench_function("hmac/sign_payload", |b| {
        b.iter(|| signer.sign(&fields).unwrap());
    });
}

fn bench_verify(c: &mut Criterion) {
    let signer = IntegritySigner::new("bench-secret");
    let fields = fields();
    let signature = signer.sign(&fields).unwrap();

    c.bench_function("hmac/verify_payload", |b| {
        b.iter(|| signer.verify(&fields, &signature));
    });
}

fn bench_encode(c: &mut Criterion) {
    let signer = IntegritySigner::new("bench-secret");
    let signature = signer.sign(&fields()).unwrap();
    let signed = SignedPayload::new(fields(), signature);

    c.bench_function("payload/encode", |b| {
        b.iter(|| encode(&signed).unwrap());
    });
}

fn bench_render_qr(c: &mut Criterion) {
    let signer = IntegritySigner::new("bench-secret");
    let signature = signer.sign(&fields()).unwrap();
    let encoded = encode(&SignedPayload::new(fields(), signature)).unwrap();

    c.bench_function("payload/render_qr_png", |b| {
        b.iter(|| render_code(&encoded).unwrap());
    });
}

fn bench_canonicalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical/canonicalize");

    for size in [1_024usize, 16_384, 262_144] {
        let line = "Invoice  TOTAL:\t100.00 USD — ﬁnal ＡＭＯＵＮＴ\r\n";
        let text: String = line.repeat(size / line.len() + 1);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| canonicalize(text));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sign,
    bench_verify,
    bench_encode,
    bench_render_qr,
    bench_canonicalize,
);
criterion_main!(benches);
