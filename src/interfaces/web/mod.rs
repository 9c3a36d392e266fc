mod handlers;
mod router;

use std::sync::Arc;

use anyhow::Result;
use axum::Json;
use tracing::info;

use crate::core::geo::Diagnostician;
use crate::core::inquiry::InquiryStore;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) diagnostician: Arc<Diagnostician>,
    pub(crate) inquiries: InquiryStore,
    pub(crate) api_port: u16,
}

pub struct ApiServer {
    state: AppState,
    api_host: String,
}

impl ApiServer {
    pub fn new(
        diagnostician: Arc<Diagnostician>,
        inquiries: InquiryStore,
        api_host: String,
        api_port: u16,
    ) -> Self {
        Self {
            state: AppState {
                diagnostician,
                inquiries,
                api_port,
            },
            api_host,
        }
    }

    /// Bind and serve until Ctrl+C.
    pub async fn serve(self) -> Result<()> {
        let addr = format!("{}:{}", self.api_host, self.state.api_port);
        let app = router::build_api_router(self.state);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("API Server running at http://{addr}");
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                tokio::signal::ctrl_c().await.ok();
            })
            .await?;
        info!("API Server shutting down...");
        Ok(())
    }
}

async fn health_endpoint() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
