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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressResponse {
    pub address: Address,
}

/// Create a smart account owned by the verified sender
pub async fn handler(
    State(state): State<ServiceState>,
    sender: VerifiedSender,
) -> Result<Response, CreateAccountError> {
    let account = state.community().create_account(sender.0).await?;
    tracing::info!(owner = %sender.0, account = %account, "created community account");

    Ok(state.responder().plain(&AddressResponse { address: account })?)
}

#[derive(Debug, thiserror::Error)]
pub enum CreateAccountError {
    #[error("community error: {0}")]
    Community(#[from] CommunityError),
    #[error(transparent)]
    Responder(#[from] ResponderError),
}

impl IntoResponse for CreateAccountError {
    fn into_response(self) -> Response {
        match self {
            CreateAccountError::Community(e) => {
                tracing::error!(error = %e, "account creation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "account creation failed" })),
                )
                    .into_response()
            }
            CreateAccountError::Responder(e) => e.into_response(),
        }
    }
}
