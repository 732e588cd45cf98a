use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::{HeaderName, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};

use common::crypto::Identity;
use common::envelope::{Envelope, EnvelopeError};

use super::auth::{Caller, PUBKEY_HEADER, SIGNATURE_HEADER};

/// Tagged response body shapes, mirroring the request side's `SecureBody`
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "response_type", rename_all = "snake_case")]
pub enum ApiResponse {
    /// A single plain object
    Object { object: serde_json::Value },
    /// A plain list of objects
    Array { objects: serde_json::Value },
    /// A sealed envelope addressed to the caller
    Secure { secure: String },
}

/// Errors that can occur emitting a response body
///
/// All of these are server-side faults for the request at hand: the handler
/// produced a body the responder could not serialize or seal.
#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    #[error("failed to serialize response body: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to seal response envelope: {0}")]
    Seal(#[from] EnvelopeError),
}

impl IntoResponse for ResponderError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "responder failure");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "internal server error" })),
        )
            .into_response()
    }
}

/// Emits plain or sealed response bodies using the service's own identity
///
/// One instance per process, cloned into handlers through the service state;
/// the identity behind it is immutable and safe to share across workers.
#[derive(Debug, Clone)]
pub struct Responder {
    identity: Arc<Identity>,
}

impl Responder {
    pub fn new(identity: Arc<Identity>) -> Self {
        Self { identity }
    }

    /// Marshal-and-write a plain tagged object; no crypto. For non-sensitive
    /// or pre-authentication responses.
    pub fn plain<T: Serialize>(&self, body: &T) -> Result<Response, ResponderError> {
        let object = serde_json::to_value(body)?;
        Ok(Json(ApiResponse::Object { object }).into_response())
    }

    /// Marshal-and-write a plain tagged list; no crypto
    pub fn plain_many<T: Serialize>(&self, bodies: &[T]) -> Result<Response, ResponderError> {
        let objects = serde_json::to_value(bodies)?;
        Ok(Json(ApiResponse::Array { objects }).into_response())
    }

    /// Seal a body for the caller recorded by the middleware
    ///
    /// Builds a fresh envelope addressed from the service identity, encrypts
    /// it for the caller's public key, and writes the signature and the
    /// service public key as response headers.
    pub fn secure<T: Serialize>(
        &self,
        caller: &Caller,
        body: &T,
    ) -> Result<Response, ResponderError> {
        let data = serde_json::to_vec(body)?;
        let envelope = Envelope::new(self.identity.address(), data);
        let sealed = envelope.seal(&caller.0, &self.identity)?;

        let mut response = Json(ApiResponse::Secure {
            secure: sealed.ciphertext,
        })
        .into_response();

        let headers = response.headers_mut();
        headers.insert(
            HeaderName::from_static(SIGNATURE_HEADER),
            HeaderValue::from_str(&sealed.signature.to_hex())
                .map_err(|e| ResponderError::Seal(EnvelopeError::Malformed(e.into())))?,
        );
        headers.insert(
            HeaderName::from_static(PUBKEY_HEADER),
            HeaderValue::from_str(&self.identity.public().to_hex())
                .map_err(|e| ResponderError::Seal(EnvelopeError::Malformed(e.into())))?,
        );

        Ok(response)
    }
}
