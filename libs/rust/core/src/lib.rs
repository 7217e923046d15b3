//! Core shared pieces for the capstone prediction services.
//!
//! Artifacts are loaded once into an [`ArtifactStore`], bound to a deployment
//! [`FeatureSchema`] by an [`InferenceService`], and served over HTTP by
//! [`http::router`].

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub mod artifact;
pub mod config;
pub mod error;
pub mod features;
pub mod http;
pub mod inference;
pub mod metrics;

pub use artifact::{ArtifactLocations, ArtifactStore, Label, Metadata, ModelArtifact, Task, TransformArtifact};
pub use config::{load_config, ServiceConfig, ServiceDefaults};
pub use error::{ArtifactLoadError, FeatureError, PredictionError, RequestError, TransformError};
pub use features::{FeatureInputs, FeatureKind, FeatureSchema, FeatureSlot, FeatureVector};
pub use inference::{predict, InferenceService, Prediction};
pub use metrics::init_metrics;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Install the global subscriber. `RUST_LOG` filters (default `info`);
/// `CAPSTONE_JSON_LOG=1|true` switches to JSON lines.
pub fn init_tracing(service: &str) -> Result<()> {
    TRACING_INIT.get_or_try_init(|| -> Result<()> {
        let json = std::env::var("CAPSTONE_JSON_LOG")
            .ok()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let fmt_layer = if json {
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true)
                .boxed()
        };
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::registry().with(fmt_layer).with(env_filter).try_init()?;
        Ok(())
    })?;
    info!(target: "capstone", service, "tracing initialized");
    Ok(())
}
