use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use common::crypto::{Address, PublicKey};

use crate::ServiceState;

/// The station's public identity; clients fetch this once to learn who to
/// encrypt for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub address: Address,
    pub public_key: PublicKey,
}

#[tracing::instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>) -> Response {
    let identity = state.identity();
    let body = IdentityResponse {
        address: identity.address(),
        public_key: *identity.public(),
    };
    (StatusCode::OK, Json(body)).into_response()
}
