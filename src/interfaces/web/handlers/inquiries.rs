use axum::{Json, extract::State};
use tracing::warn;

use super::super::AppState;
use crate::core::inquiry::NewInquiry;

pub async fn create_inquiry_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<NewInquiry>,
) -> Json<serde_json::Value> {
    match state.inquiries.save(&payload).await {
        Ok(id) => Json(serde_json::json!({ "success": true, "id": id })),
        Err(e) => {
            warn!("Inquiry rejected: {}", e);
            Json(serde_json::json!({ "success": false, "error": e.to_string() }))
        }
    }
}
