use axum::extract::{Query, State};
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
pub struct MintVoucherRequest {
    pub name: String,
    pub description: String,
    pub minter_name: String,
    pub amount: i64,
}

/// Filter for the voucher transfer listing; any position may be left open
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoucherQuery {
    pub owner: Option<Address>,
    pub from: Option<Address>,
    pub to: Option<Address>,
}

/// List voucher transfers on the community token, optionally filtered
pub async fn list(
    State(state): State<ServiceState>,
    Query(query): Query<VoucherQuery>,
) -> Result<Response, ListVouchersError> {
    let transfers = state
        .community()
        .list_vouchers(query.owner, query.from, query.to)
        .await?;

    Ok(state.responder().plain_many(&transfers)?)
}

/// Mint voucher metadata on behalf of the verified sender
pub async fn mint(
    State(state): State<ServiceState>,
    sender: VerifiedSender,
    Json(req): Json<MintVoucherRequest>,
) -> Result<Response, MintVoucherError> {
    let metadata = state
        .community()
        .mint_voucher(
            sender.0,
            req.name,
            req.description,
            req.minter_name,
            req.amount,
        )
        .await?;

    Ok(state.responder().plain(&metadata)?)
}

#[derive(Debug, thiserror::Error)]
pub enum MintVoucherError {
    #[error("community error: {0}")]
    Community(#[from] CommunityError),
    #[error(transparent)]
    Responder(#[from] ResponderError),
}

impl IntoResponse for MintVoucherError {
    fn into_response(self) -> Response {
        match self {
            MintVoucherError::Community(CommunityError::UploaderNotConfigured) => (
                StatusCode::NOT_IMPLEMENTED,
                Json(serde_json::json!({ "error": "voucher uploads are not configured" })),
            )
                .into_response(),
            MintVoucherError::Community(e) => {
                tracing::error!(error = %e, "voucher mint failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "voucher mint failed" })),
                )
                    .into_response()
            }
            MintVoucherError::Responder(e) => e.into_response(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListVouchersError {
    #[error("community error: {0}")]
    Community(#[from] CommunityError),
    #[error(transparent)]
    Responder(#[from] ResponderError),
}

impl IntoResponse for ListVouchersError {
    fn into_response(self) -> Response {
        match self {
            ListVouchersError::Community(e) => {
                tracing::error!(error = %e, "voucher listing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "voucher listing failed" })),
                )
                    .into_response()
            }
            ListVouchersError::Responder(e) => e.into_response(),
        }
    }
}
