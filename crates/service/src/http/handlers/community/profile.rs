use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use common::crypto::Address;

use crate::community::CommunityError;
use crate::http::auth::VerifiedSender;
use crate::http::responder::ResponderError;
use crate::ServiceState;

use super::account::AddressResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub account: Address,
}

/// Create a profile for a smart account the verified sender owns
pub async fn handler(
    State(state): State<ServiceState>,
    sender: VerifiedSender,
    Json(req): Json<CreateProfileRequest>,
) -> Result<Response, CreateProfileError> {
    let profile = state
        .community()
        .create_profile(sender.0, req.account)
        .await?;
    tracing::info!(owner = %sender.0, profile = %profile, "created community profile");

    Ok(state.responder().plain(&AddressResponse { address: profile })?)
}

#[derive(Debug, thiserror::Error)]
pub enum CreateProfileError {
    #[error("community error: {0}")]
    Community(#[from] CommunityError),
    #[error(transparent)]
    Responder(#[from] ResponderError),
}

impl IntoResponse for CreateProfileError {
    fn into_response(self) -> Response {
        match self {
            CreateProfileError::Community(CommunityError::NotAccountOwner) => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "unauthorized" })),
            )
                .into_response(),
            CreateProfileError::Community(e) => {
                tracing::error!(error = %e, "profile creation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "profile creation failed" })),
                )
                    .into_response()
            }
            CreateProfileError::Responder(e) => e.into_response(),
        }
    }
}
