//! HTTP JSON surface shared by both services.

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::error::RequestError;
use crate::features::FeatureInputs;
use crate::inference::{InferenceService, Prediction};
use crate::metrics;

/// Renders the one-line human summary for a prediction.
pub type Summarizer = fn(&Prediction) -> String;

pub struct AppState {
    service_name: String,
    inference: InferenceService,
    summarize: Summarizer,
    live: AtomicBool,
    ready: AtomicBool,
}

impl AppState {
    /// New state starts live but not ready.
    pub fn new(service_name: impl Into<String>, inference: InferenceService, summarize: Summarizer) -> Self {
        Self {
            service_name: service_name.into(),
            inference,
            summarize,
            live: AtomicBool::new(true),
            ready: AtomicBool::new(false),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn inference(&self) -> &InferenceService {
        &self.inference
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn clear_ready(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    pub fn mark_not_live(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Deserialize)]
struct PredictRequest {
    features: FeatureInputs,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/predict", post(predict_handler))
        .route("/v1/schema", get(schema_handler))
        .route("/v1/model", get(model_handler))
        .route("/live", get(live_handler))
        .route("/ready", get(ready_handler))
        .route("/status", get(status_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

fn error_body(status: StatusCode, error: impl std::fmt::Display, kind: &str) -> Response {
    (status, Json(json!({"error": error.to_string(), "kind": kind}))).into_response()
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = if self.is_rejection() { StatusCode::UNPROCESSABLE_ENTITY } else { StatusCode::INTERNAL_SERVER_ERROR };
        error_body(status, &self, self.kind())
    }
}

async fn predict_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    if !state.is_ready() {
        return error_body(StatusCode::SERVICE_UNAVAILABLE, "service not ready", "not_ready");
    }
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection, "malformed predict request");
            return error_body(rejection.status(), rejection.body_text(), "malformed_request");
        }
    };

    let request_id = Uuid::new_v4();
    let span = info_span!("predict_request", %request_id, service = %state.service_name);
    match span.in_scope(|| state.inference.predict_inputs(&state.service_name, &request.features)) {
        Ok(prediction) => {
            let summary = (state.summarize)(&prediction);
            Json(json!({"request_id": request_id, "prediction": prediction, "summary": summary})).into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn schema_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "service": state.service_name,
        "features": state.inference.schema().slots(),
    }))
}

async fn model_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let store = state.inference.store();
    Json(json!({
        "service": state.service_name,
        "task": state.inference.task(),
        "kind": store.model().kind(),
        "feature_names": store.model().feature_names(),
        "transform": store.transform().map(|t| t.kind()),
        "metadata": store.metadata(),
        "digests": store.digests(),
        "loaded_at": store.loaded_at(),
    }))
}

async fn live_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({"live": state.is_live()}))
}

async fn ready_handler(State(state): State<Arc<AppState>>) -> Response {
    let ready = state.is_ready();
    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(json!({"ready": ready}))).into_response()
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let store = state.inference.store();
    Json(json!({
        "service": state.service_name,
        "live": state.is_live(),
        "ready": state.is_ready(),
        "model_kind": store.model().kind(),
        "model_digest": store.digests().model,
        "loaded_at": store.loaded_at(),
    }))
}

async fn metrics_handler() -> Response {
    let Some(m) = metrics::metrics() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "metrics not initialized").into_response();
    };
    match m.encode() {
        Ok(buf) => (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; version=0.0.4")], buf).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("encode error: {e}")).into_response(),
    }
}

/// Bind `addr` and serve until ctrl-c. Readiness is cleared once shutdown starts.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    let shutdown_state = state.clone();
    serve_on(listener, state, async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "ctrl-c handler failed");
        }
        shutdown_state.clear_ready();
        info!("shutdown requested");
    })
    .await
}

pub async fn serve_on<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("reading listener address")?;
    info!(%addr, service = %state.service_name, "http server listening");
    axum::serve(listener, router(state)).with_graceful_shutdown(shutdown).await.context("http server failed")?;
    Ok(())
}
