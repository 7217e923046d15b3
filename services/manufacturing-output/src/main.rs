use anyhow::Result;
use capstone_core::http::{serve, AppState};
use capstone_core::{init_metrics, init_tracing, load_config};
use std::sync::Arc;
use tracing::{error, info};

use manufacturing_output::{build_service, defaults, summarize, SERVICE_NAME};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(SERVICE_NAME)?;
    init_metrics()?;

    let cfg = load_config(SERVICE_NAME, &defaults())?;
    info!(?cfg, "config loaded");
    let addr = cfg.listen_addr()?;

    let service = match build_service(&cfg.artifacts) {
        Ok(service) => service,
        Err(e) => {
            error!(error = ?e, "startup failed, not serving");
            return Err(e);
        }
    };

    let state = Arc::new(AppState::new(cfg.service_name.clone(), service, summarize));
    state.mark_ready();
    info!("service ready");
    serve(addr, state).await?;
    info!("shutdown");
    Ok(())
}
