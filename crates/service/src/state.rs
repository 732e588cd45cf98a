use std::sync::Arc;

use url::Url;

use common::chain::ChainConfig;
use common::crypto::Identity;

use super::chain::HttpChainClient;
use super::community::Community;
use super::config::Config;
use super::http::auth::AuthPolicy;
use super::http::responder::Responder;
use super::push::PushRegistry;
use super::voucher::VoucherUploader;

/// Main service state - one instance per process, cheap to clone per request
///
/// The identity (private key material) is loaded once here and shared
/// read-only with the middleware and responder; nothing else in the protocol
/// holds mutable state across requests.
#[derive(Clone)]
pub struct State {
    identity: Arc<Identity>,
    community: Arc<Community>,
    push: Arc<PushRegistry>,
    responder: Responder,
    auth_policy: Arc<AuthPolicy>,
}

impl State {
    pub fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        let identity = Arc::new(Identity::from(config.secret_key.clone()));
        tracing::info!(address = %identity.address(), "station identity loaded");

        let rpc = config
            .community
            .chain
            .primary_rpc()
            .ok_or(StateSetupError::MissingRpcEndpoint)?;
        let rpc = Url::parse(rpc).map_err(|_| StateSetupError::InvalidRpcEndpoint)?;
        let chain_client = Arc::new(HttpChainClient::new(rpc));

        let uploader = config.voucher_base_url.clone().map(VoucherUploader::new);
        let community = Arc::new(Community::new(
            chain_client,
            config.community.clone(),
            uploader,
        ));

        let auth_policy = Arc::new(AuthPolicy {
            exempt_prefixes: config.exempt_path_prefixes.clone(),
        });

        Ok(Self::new(identity, community, auth_policy))
    }

    /// Assemble state from already-built parts; used by tests to swap in a
    /// mock chain client behind the community facade
    pub fn new(
        identity: Arc<Identity>,
        community: Arc<Community>,
        auth_policy: Arc<AuthPolicy>,
    ) -> Self {
        let responder = Responder::new(identity.clone());
        Self {
            identity,
            community,
            push: Arc::new(PushRegistry::new()),
            responder,
            auth_policy,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.community.export_address().chain
    }

    pub fn community(&self) -> &Community {
        &self.community
    }

    pub fn push(&self) -> &PushRegistry {
        &self.push
    }

    pub fn responder(&self) -> &Responder {
        &self.responder
    }

    pub fn auth_policy(&self) -> &AuthPolicy {
        &self.auth_policy
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("chain descriptor has no rpc endpoint")]
    MissingRpcEndpoint,
    #[error("chain descriptor rpc endpoint is not a valid URL")]
    InvalidRpcEndpoint,
}
