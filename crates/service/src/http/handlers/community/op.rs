use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use common::userop::UserOperation;

use crate::community::CommunityError;
use crate::http::auth::VerifiedSender;
use crate::http::responder::ResponderError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOpRequest {
    pub op: UserOperation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOpResponse {
    pub hash: String,
}

/// Sponsor and submit a caller-built user operation
pub async fn handler(
    State(state): State<ServiceState>,
    sender: VerifiedSender,
    Json(req): Json<SubmitOpRequest>,
) -> Result<Response, SubmitOpError> {
    tracing::debug!(sender = %sender.0, op_sender = %req.op.sender, "submitting user operation");
    let hash = state.community().submit_op(req.op).await?;

    Ok(state.responder().plain(&SubmitOpResponse { hash })?)
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitOpError {
    #[error("community error: {0}")]
    Community(#[from] CommunityError),
    #[error(transparent)]
    Responder(#[from] ResponderError),
}

impl IntoResponse for SubmitOpError {
    fn into_response(self) -> Response {
        match self {
            SubmitOpError::Community(e) => {
                tracing::error!(error = %e, "user operation submission failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "operation submission failed" })),
                )
                    .into_response()
            }
            SubmitOpError::Responder(e) => e.into_response(),
        }
    }
}
