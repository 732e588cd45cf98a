use clap::Args;

use common::crypto::Identity;
use service::http::client::{ClientError, SecureClient};
use service::http::handlers::hello::HelloResponse;

use crate::state::AppState;

/// Greet a station: proves the envelope round trip end to end
#[derive(Args, Debug, Clone)]
pub struct Hello;

#[derive(Debug, thiserror::Error)]
pub enum HelloError {
    #[error("state error: {0}")]
    State(#[from] crate::state::StateError),
    #[error("client error: {0}")]
    Client(#[from] ClientError),
}

#[async_trait::async_trait]
impl crate::op::Op for Hello {
    type Error = HelloError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;
        let identity = Identity::from(state.load_key()?);

        let client = SecureClient::connect(ctx.remote.clone(), identity).await?;
        let hello: HelloResponse = client.get("hello").await?;

        let balance = hello.paymaster_balance.as_deref().unwrap_or("unknown");
        Ok(format!(
            "Station {} on {} (chain id {})\nPaymaster balance: {} ETH",
            hello.address, hello.name, hello.chain_id, balance
        ))
    }
}
