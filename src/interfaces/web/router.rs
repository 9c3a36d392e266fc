use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, header},
    middleware,
    middleware::Next,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::handlers::{diagnose, inquiries};
use super::{AppState, health_endpoint};

fn build_localhost_cors(api_port: u16) -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        format!("http://127.0.0.1:{}", api_port),
        format!("http://localhost:{}", api_port),
    ]
    .iter()
    .filter_map(|o| o.parse().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

pub(crate) fn build_api_router(state: AppState) -> Router {
    let cors = build_localhost_cors(state.api_port);

    Router::new()
        .route("/api/health", get(health_endpoint))
        .route("/api/diagnose", post(diagnose::diagnose_endpoint))
        .route(
            "/api/diagnose/stream",
            post(diagnose::diagnose_stream_endpoint),
        )
        .route("/api/inquiries", post(inquiries::create_inquiry_endpoint))
        .layer(middleware::from_fn(security_headers))
        .layer(cors)
        .with_state(state)
}

async fn security_headers(req: Request<Body>, next: Next) -> axum::response::Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    response
}
