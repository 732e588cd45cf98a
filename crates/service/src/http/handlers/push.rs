use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use common::crypto::Address;

use crate::http::auth::{Caller, VerifiedSender};
use crate::http::responder::ResponderError;
use crate::ServiceState;

pub fn router() -> Router<ServiceState> {
    Router::new()
        .route("/associate", axum::routing::put(associate))
        .route("/dissociate", axum::routing::delete(dissociate))
        .route("/list", get(list))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushTokenRequest {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushTokenList {
    pub tokens: Vec<String>,
}

/// Register a push token for the verified sender; idempotent
pub async fn associate(
    State(state): State<ServiceState>,
    sender: VerifiedSender,
    Json(req): Json<PushTokenRequest>,
) -> StatusCode {
    tracing::debug!(address = %sender.0, "associating push token");
    state.push().associate(sender.0, req.token);
    StatusCode::CREATED
}

/// Remove a push token from the verified sender; unknown tokens are a no-op
pub async fn dissociate(
    State(state): State<ServiceState>,
    sender: VerifiedSender,
    Json(req): Json<PushTokenRequest>,
) -> StatusCode {
    tracing::debug!(address = %sender.0, "dissociating push token");
    state.push().dissociate(sender.0, &req.token);
    StatusCode::OK
}

/// List the caller's registered push tokens, sealed for the caller
pub async fn list(
    State(state): State<ServiceState>,
    caller: Caller,
) -> Result<Response, ResponderError> {
    let address = Address::from(&caller.0);
    let tokens = state.push().list(address);
    state.responder().secure(&caller, &PushTokenList { tokens })
}
