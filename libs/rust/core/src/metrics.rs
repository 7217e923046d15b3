//! Prometheus metrics for prediction traffic and artifact loading.
//!
//! The registry is created once by [`init_metrics`]. Recording before that is
//! a no-op, so the library can be used without a metrics endpoint.

use anyhow::Result;
use once_cell::sync::OnceCell;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

static METRICS: OnceCell<InferenceMetrics> = OnceCell::new();

#[derive(Clone, Debug)]
pub struct InferenceMetrics {
    registry: Registry,
    pub predictions_total: IntCounterVec,
    pub prediction_latency_ms: HistogramVec,
    pub artifact_loads_total: IntCounterVec,
}

impl InferenceMetrics {
    fn new() -> Result<Self> {
        let registry = Registry::new();
        let predictions_total = IntCounterVec::new(
            Opts::new("capstone_predictions_total", "Prediction requests by outcome (ok, rejected, failed)"),
            &["service", "outcome"],
        )?;
        let prediction_latency_ms = HistogramVec::new(
            HistogramOpts::new("capstone_prediction_latency_ms", "Latency of validate + transform + predict (ms)")
                .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 50.0]),
            &["service"],
        )?;
        let artifact_loads_total = IntCounterVec::new(
            Opts::new("capstone_artifact_loads_total", "Artifact store load attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;
        registry.register(Box::new(prediction_latency_ms.clone()))?;
        registry.register(Box::new(artifact_loads_total.clone()))?;
        Ok(Self { registry, predictions_total, prediction_latency_ms, artifact_loads_total })
    }

    /// Text exposition of every registered metric family.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(buf)
    }
}

pub fn init_metrics() -> Result<&'static InferenceMetrics> {
    METRICS.get_or_try_init(InferenceMetrics::new)
}

pub fn metrics() -> Option<&'static InferenceMetrics> {
    METRICS.get()
}

pub fn record_prediction(service: &str, outcome: &str, latency_ms: f64) {
    if let Some(m) = METRICS.get() {
        m.predictions_total.with_label_values(&[service, outcome]).inc();
        m.prediction_latency_ms.with_label_values(&[service]).observe(latency_ms);
    }
}

pub fn record_artifact_load(ok: bool) {
    if let Some(m) = METRICS.get() {
        m.artifact_loads_total.with_label_values(&[if ok { "ok" } else { "failed" }]).inc();
    }
}
