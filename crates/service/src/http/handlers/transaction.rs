use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::community::CommunityError;
use crate::http::auth::VerifiedSender;
use crate::http::responder::ResponderError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendTransactionRequest {
    /// RLP-encoded, client-signed transaction as "0x" hex
    pub raw: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendTransactionResponse {
    pub hash: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    sender: VerifiedSender,
    Json(req): Json<SendTransactionRequest>,
) -> Result<Response, SendTransactionError> {
    if !req.raw.starts_with("0x") {
        return Err(SendTransactionError::NotHex);
    }

    tracing::debug!(sender = %sender.0, "forwarding raw transaction");
    let hash = state.community().send_raw_transaction(&req.raw).await?;

    Ok(state
        .responder()
        .plain(&SendTransactionResponse { hash })?)
}

#[derive(Debug, thiserror::Error)]
pub enum SendTransactionError {
    #[error("raw transaction must be 0x-prefixed hex")]
    NotHex,
    #[error("community error: {0}")]
    Community(#[from] CommunityError),
    #[error(transparent)]
    Responder(#[from] ResponderError),
}

impl IntoResponse for SendTransactionError {
    fn into_response(self) -> Response {
        match self {
            SendTransactionError::NotHex => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": self.to_string() })),
            )
                .into_response(),
            SendTransactionError::Community(e) => {
                tracing::error!(error = %e, "raw transaction submission failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "transaction submission failed" })),
                )
                    .into_response()
            }
            SendTransactionError::Responder(e) => e.into_response(),
        }
    }
}
