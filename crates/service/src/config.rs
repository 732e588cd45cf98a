use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use url::Url;

use common::chain::CommunityAddress;
use common::crypto::SecretKey;

/// Runtime configuration for the station service
#[derive(Debug)]
pub struct Config {
    /// address for the API server to listen on
    pub listen_addr: SocketAddr,
    /// the service's own secret key; its identity is derived from this once
    /// at startup
    pub secret_key: SecretKey,
    /// address book of the deployed community contracts, including the
    /// chain descriptor
    pub community: CommunityAddress,
    /// base URL of the voucher upload service, if configured
    pub voucher_base_url: Option<Url>,
    /// path prefixes the envelope middleware leaves alone
    pub exempt_path_prefixes: Vec<String>,

    // misc
    pub log_level: tracing::Level,
    /// write rolling log files here in addition to stdout, if set
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn new(secret_key: SecretKey, community: CommunityAddress) -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 3000),
            secret_key,
            community,
            voucher_base_url: None,
            exempt_path_prefixes: vec!["/_status".to_string()],
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}
