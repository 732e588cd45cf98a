use axum::async_trait;
use axum::body::Body;
use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use http::request::Parts;
use http::{header, HeaderValue, Method, StatusCode};
use serde::{Deserialize, Serialize};

use common::crypto::{Address, PublicKey, RecoverableSignature};
use common::envelope::Envelope;

use crate::ServiceState;

use super::error::AuthError;

/// Header carrying the compact recoverable signature, hex encoded
pub const SIGNATURE_HEADER: &str = "x-signature";
/// Header carrying the caller's (or service's) public key, hex encoded
pub const PUBKEY_HEADER: &str = "x-pubkey";

/// Largest sealed request body the middleware will buffer
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Request body shape for protected routes
#[derive(Debug, Serialize, Deserialize)]
pub struct SecureBody {
    /// Base64 ECIES ciphertext of the canonical envelope bytes
    pub secure: String,
}

/// Which requests the envelope middleware touches
///
/// Safe methods always skip body verification (they carry no body to
/// verify) but still require the caller's public key so the response can be
/// encrypted. Exempt path prefixes bypass the middleware entirely; this is
/// explicit configuration, never a hardcoded path comparison in the
/// middleware body.
#[derive(Debug, Clone)]
pub struct AuthPolicy {
    pub exempt_prefixes: Vec<String>,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            exempt_prefixes: vec!["/_status".to_string()],
        }
    }
}

impl AuthPolicy {
    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix))
    }

    fn skips_body_verification(&self, method: &Method) -> bool {
        matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
    }
}

/// The caller's public key, recorded by the middleware for response
/// encryption
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub PublicKey);

/// The sender address recovered from a verified envelope signature
///
/// Only present on requests whose body passed verification; downstream
/// handlers trust it without re-verifying.
#[derive(Debug, Clone, Copy)]
pub struct VerifiedSender(pub Address);

/// Extractor rejection: the middleware/handler contract was violated
///
/// A handler asked for request context the middleware never attached, e.g. a
/// secure responder wired onto an unauthenticated route. This is a server
/// bug, not a client error.
#[derive(Debug, thiserror::Error)]
#[error("missing {0} in request context")]
pub struct MissingRequestContext(&'static str);

impl IntoResponse for MissingRequestContext {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "handler used outside the envelope middleware");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "internal server error" })),
        )
            .into_response()
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = MissingRequestContext;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .copied()
            .ok_or(MissingRequestContext("caller public key"))
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for VerifiedSender {
    type Rejection = MissingRequestContext;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedSender>()
            .copied()
            .ok_or(MissingRequestContext("verified sender address"))
    }
}

/// The envelope middleware: decrypt, verify, recover identity, rewrite the
/// body
///
/// On success the downstream handler observes a plaintext, already
/// authenticated body plus [`Caller`] and [`VerifiedSender`] in the request
/// extensions. On any failure the request stops here with a uniform
/// rejection.
pub async fn secure_envelope(
    State(state): State<ServiceState>,
    request: Request,
    next: Next,
) -> Response {
    match apply(&state, request).await {
        Ok(request) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

async fn apply(state: &ServiceState, request: Request) -> Result<Request, AuthError> {
    if state.auth_policy().is_exempt(request.uri().path()) {
        return Ok(request);
    }

    // without the caller's key there is no way to address an encrypted reply
    let caller = header_value(&request, PUBKEY_HEADER).ok_or(AuthError::MissingPublicKey)?;
    let caller = Caller(PublicKey::from_hex(&caller).map_err(|e| AuthError::Malformed(e.into()))?);

    if state.auth_policy().skips_body_verification(request.method()) {
        let mut request = request;
        request.extensions_mut().insert(caller);
        return Ok(request);
    }

    let signature = header_value(&request, SIGNATURE_HEADER).ok_or(AuthError::MissingSignature)?;
    let signature =
        RecoverableSignature::from_hex(&signature).map_err(|e| AuthError::Malformed(e.into()))?;

    let (mut parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_SIZE)
        .await
        .map_err(|e| AuthError::Malformed(anyhow::anyhow!("unreadable body: {e}")))?;
    let sealed: SecureBody =
        serde_json::from_slice(&bytes).map_err(|e| AuthError::Malformed(e.into()))?;

    let envelope = Envelope::open(
        &sealed.secure,
        &signature,
        state.identity(),
        Utc::now().timestamp(),
    )?;

    tracing::debug!(sender = %envelope.address, "envelope verified");

    // hand the handler the plaintext payload, length corrected
    parts.extensions.insert(caller);
    parts.extensions.insert(VerifiedSender(envelope.address));
    parts
        .headers
        .insert(header::CONTENT_LENGTH, HeaderValue::from(envelope.data.len()));
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    Ok(Request::from_parts(parts, Body::from(envelope.data)))
}

fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_policy_exempt_prefixes() {
        let policy = AuthPolicy::default();
        assert!(policy.is_exempt("/_status/healthz"));
        assert!(policy.is_exempt("/_status/version"));
        assert!(!policy.is_exempt("/hello"));
        assert!(!policy.is_exempt("/community/config"));
    }

    #[test]
    fn test_policy_safe_methods_skip_body() {
        let policy = AuthPolicy::default();
        assert!(policy.skips_body_verification(&Method::GET));
        assert!(policy.skips_body_verification(&Method::HEAD));
        assert!(policy.skips_body_verification(&Method::OPTIONS));
        assert!(!policy.skips_body_verification(&Method::POST));
        assert!(!policy.skips_body_verification(&Method::PUT));
        assert!(!policy.skips_body_verification(&Method::DELETE));
    }
}
