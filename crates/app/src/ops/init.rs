use std::path::PathBuf;

use clap::Args;

use crate::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// API server listen address
    #[arg(long, default_value = "0.0.0.0:3000")]
    pub listen_addr: String,

    /// Community address book to install (a <name>.community.json file)
    #[arg(long)]
    pub community: Option<PathBuf>,

    /// Base URL of the voucher upload service
    #[arg(long)]
    pub voucher_base_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            listen_addr: self.listen_addr.clone(),
            voucher_base_url: self.voucher_base_url.clone(),
            ..AppConfig::default()
        };

        let state = AppState::init(
            ctx.config_path.clone(),
            Some(config),
            self.community.clone(),
        )?;

        let community_str = if state.community_path.exists() {
            state.community_path.display().to_string()
        } else {
            format!(
                "not installed (place one at {} before serving)",
                state.community_path.display()
            )
        };

        let output = format!(
            "Initialized station directory at: {}\n\
             - Key: {}\n\
             - Config: {}\n\
             - Community: {}\n\
             - Listen address: {}",
            state.station_dir.display(),
            state.key_path.display(),
            state.config_path.display(),
            community_str,
            state.config.listen_addr,
        );

        Ok(output)
    }
}
