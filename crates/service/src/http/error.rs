use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

use common::envelope::EnvelopeError;

/// Authentication failures raised by the envelope middleware
///
/// Variants stay distinct internally for logging, but everything a caller
/// could use to map the verifier collapses to one generic unauthorized
/// response: an attacker must not be able to tell "expired" from "wrong key"
/// from "tampered ciphertext" by looking at the reply.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing public key header")]
    MissingPublicKey,
    #[error("missing signature header")]
    MissingSignature,
    #[error("malformed input: {0}")]
    Malformed(anyhow::Error),
    #[error(transparent)]
    Envelope(EnvelopeError),
}

impl From<EnvelopeError> for AuthError {
    fn from(err: EnvelopeError) -> Self {
        // structurally bad envelopes are client formatting errors, the rest
        // are verification failures
        match err {
            EnvelopeError::Malformed(e) => AuthError::Malformed(e),
            other => AuthError::Envelope(other),
        }
    }
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::Malformed(_) => StatusCode::BAD_REQUEST,
            AuthError::MissingPublicKey
            | AuthError::MissingSignature
            | AuthError::Envelope(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(error = %self, status = %status, "request rejected by envelope middleware");

        // uniform bodies per status; the specific failure is never surfaced
        let message = match status {
            StatusCode::BAD_REQUEST => "bad request",
            _ => "unauthorized",
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_verification_failures_collapse_to_unauthorized() {
        assert_eq!(
            AuthError::Envelope(EnvelopeError::Expired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Envelope(EnvelopeError::AddressMismatch).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::MissingPublicKey.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_malformed_input_is_bad_request() {
        assert_eq!(
            AuthError::Malformed(anyhow::anyhow!("bad hex")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::from(EnvelopeError::Malformed(anyhow::anyhow!("bad json"))).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
