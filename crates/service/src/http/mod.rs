use std::net::SocketAddr;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use http::header::{ACCEPT, CONTENT_TYPE, ORIGIN};
use http::{HeaderName, Method};
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;

pub mod auth;
pub mod client;
pub mod error;
pub mod handlers;
pub mod responder;

mod health;

pub use handlers::not_found_handler;

use crate::ServiceState;

const STATUS_PREFIX: &str = "/_status";

/// Build the full station router: status routes outside the envelope
/// middleware, everything else behind it
pub fn router(state: ServiceState) -> Router {
    // preflight requests are answered by the CORS layer and must be able to
    // advertise the protocol headers
    let cors = CorsLayer::new()
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(vec![
            ACCEPT,
            ORIGIN,
            CONTENT_TYPE,
            HeaderName::from_static(auth::SIGNATURE_HEADER),
            HeaderName::from_static(auth::PUBKEY_HEADER),
        ])
        .expose_headers(vec![
            HeaderName::from_static(auth::SIGNATURE_HEADER),
            HeaderName::from_static(auth::PUBKEY_HEADER),
        ])
        .allow_origin(Any);

    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    Router::new()
        .nest(STATUS_PREFIX, health::router())
        .route("/hello", get(handlers::hello::handler))
        .route("/transaction", post(handlers::transaction::handler))
        .nest("/community", handlers::community::router())
        .nest("/push", handlers::push::router())
        .fallback(handlers::not_found_handler)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::secure_envelope,
        ))
        .with_state(state)
        .layer(cors)
        .layer(trace_layer)
}

/// Run the station API server until the shutdown signal flips
pub async fn run(
    listen_addr: SocketAddr,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let router = router(state);

    tracing::info!(addr = ?listen_addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
