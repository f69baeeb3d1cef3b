//! # Prometheus Metrics
//!
//! Operational metrics for the attestation node, scraped by Prometheus at
//! `/metrics` on the configured metrics port.
//!
//! All metrics live in a dedicated [`prometheus::Registry`] prefixed with
//! `docseal_`, so they never collide with the default global registry.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the node.
#[derive(Clone)]
pub struct NodeMetrics {
    registry: Registry,
    /// Documents accepted by `POST /documents`.
    pub documents_ingested_total: IntCounter,
    /// Verification payloads served.
    pub payloads_built_total: IntCounter,
    /// Builds that had to (re)compute at least one stored field.
    pub payloads_healed_total: IntCounter,
    pub proofs_accepted_total: IntCounter,
    pub proofs_rejected_total: IntCounter,
    /// Builds whose healed fields could not be persisted after retries.
    pub persistence_warnings_total: IntCounter,
    /// Time to build the payload and check a submitted proof, in seconds.
    pub proof_verification_seconds: Histogram,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("docseal".into()), None)
            .expect("failed to create prometheus registry");

        let documents_ingested_total = counter(
            &registry,
            "documents_ingested_total",
            "Total number of documents ingested",
        );
        let payloads_built_total = counter(
            &registry,
            "payloads_built_total",
            "Total number of verification payloads served",
        );
        let payloads_healed_total = counter(
            &registry,
            "payloads_healed_total",
            "Total number of payload builds that regenerated stored fields",
        );
        let proofs_accepted_total = counter(
            &registry,
            "proofs_accepted_total",
            "Total number of zero-knowledge proofs accepted",
        );
        let proofs_rejected_total = counter(
            &registry,
            "proofs_rejected_total",
            "Total number of zero-knowledge proofs rejected",
        );
        let persistence_warnings_total = counter(
            &registry,
            "persistence_warnings_total",
            "Total number of payload builds whose healed fields were not persisted",
        );

        let proof_verification_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "proof_verification_seconds",
                "Latency of zero-knowledge proof verification requests in seconds",
            )
            .buckets(vec![
                0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
        )
        .expect("metric creation");
        registry
            .register(Box::new(proof_verification_seconds.clone()))
            .expect("metric registration");

        Self {
            registry,
            documents_ingested_total,
            payloads_built_total,
            payloads_healed_total,
            proofs_accepted_total,
            proofs_rejected_total,
            persistence_warnings_total,
            proof_verification_seconds,
        }
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer).expect("prometheus output is valid utf-8"))
    }
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn counter(registry: &Registry, name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::new(name, help).expect("metric creation");
    registry
        .register(Box::new(counter.clone()))
        .expect("metric registration");
    counter
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(State(metrics): State<SharedMetrics>) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_are_prefixed_and_exported() {
        let metrics = NodeMetrics::new();
        metrics.documents_ingested_total.inc();
        metrics.proofs_rejected_total.inc_by(2);
        metrics.proof_verification_seconds.observe(0.002);

        let text = metrics.encode().unwrap();
        assert!(text.contains("docseal_documents_ingested_total 1"));
        assert!(text.contains("docseal_proofs_rejected_total 2"));
        assert!(text.contains("docseal_proof_verification_seconds_count 1"));
    }

    #[test]
    fn separate_instances_do_not_share_counts() {
        let a = NodeMetrics::new();
        let b = NodeMetrics::new();
        a.payloads_built_total.inc();
        assert_eq!(a.payloads_built_total.get(), 1);
        assert_eq!(b.payloads_built_total.get(), 0);
    }
}
