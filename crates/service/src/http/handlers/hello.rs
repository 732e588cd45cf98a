use axum::extract::State;
use axum::response::Response;
use serde::{Deserialize, Serialize};

use common::crypto::Address;
use common::wei;

use crate::http::auth::Caller;
use crate::http::responder::ResponderError;
use crate::ServiceState;

/// Station greeting: which chain this station drives, who it is, and how
/// much gas sponsorship is left in the tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloResponse {
    pub name: String,
    pub chain_id: u64,
    pub address: Address,
    /// Paymaster balance as a decimal eth string; absent when the chain
    /// node could not be reached
    pub paymaster_balance: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    caller: Caller,
) -> Result<Response, ResponderError> {
    let paymaster_balance = match state.community().paymaster_balance().await {
        Ok(balance) => Some(wei::wei_to_eth_string(balance)),
        Err(e) => {
            tracing::warn!(error = %e, "paymaster balance unavailable");
            None
        }
    };

    let chain = state.chain();
    let body = HelloResponse {
        name: chain.name.clone(),
        chain_id: chain.chain_id,
        address: state.identity().address(),
        paymaster_balance,
    };
    state.responder().secure(&caller, &body)
}
