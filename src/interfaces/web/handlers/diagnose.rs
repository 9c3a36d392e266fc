use std::convert::Infallible;

use axum::{
    Json,
    extract::State,
    response::IntoResponse,
    response::sse::{Event, Sse},
};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::warn;

use super::super::AppState;
use crate::core::geo::{DiagnosticRequest, RunEvent};

#[derive(serde::Deserialize)]
pub struct DiagnoseRequest {
    #[serde(default)]
    brand: String,
    #[serde(default)]
    keyword: String,
}

pub async fn diagnose_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<DiagnoseRequest>,
) -> Json<serde_json::Value> {
    let request = match DiagnosticRequest::new(&payload.brand, &payload.keyword) {
        Ok(r) => r,
        Err(e) => return Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    };

    match state.diagnostician.run(&request, None).await {
        Ok(run) => Json(serde_json::json!({ "success": true, "run": run })),
        Err(e) => {
            warn!("Diagnosis for [{}] failed: {}", request.brand, e);
            Json(serde_json::json!({ "success": false, "error": e.to_string() }))
        }
    }
}

/// Server-sent events: one `RunEvent` per message, then a final `done` or
/// `error` message.
pub async fn diagnose_stream_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<DiagnoseRequest>,
) -> axum::response::Response {
    let request = match DiagnosticRequest::new(&payload.brand, &payload.keyword) {
        Ok(r) => r,
        Err(e) => {
            return Json(serde_json::json!({ "success": false, "error": e.to_string() }))
                .into_response();
        }
    };

    let (tx, rx) = mpsc::channel::<String>(32);
    let diagnostician = state.diagnostician.clone();

    tokio::spawn(async move {
        let (event_tx, mut event_rx) = mpsc::channel::<RunEvent>(32);
        let forward_tx = tx.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                if let Ok(msg) = serde_json::to_string(&event) {
                    let _ = forward_tx.send(msg).await;
                }
            }
        });

        let outcome = diagnostician.run(&request, Some(event_tx)).await;
        forwarder.await.ok();

        let last = match outcome {
            Ok(run) => serde_json::json!({
                "type": "done",
                "run_id": run.run_id,
                "summary": run.summary,
            }),
            Err(e) => {
                warn!("Streaming diagnosis for [{}] failed: {}", request.brand, e);
                serde_json::json!({ "type": "error", "message": e.to_string() })
            }
        };
        let _ = tx.send(last.to_string()).await;
    });

    let stream = tokio_stream::wrappers::ReceiverStream::new(rx)
        .map(|msg| Ok::<_, Infallible>(Event::default().data(msg)));

    Sse::new(stream).into_response()
}
