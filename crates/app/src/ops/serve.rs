use clap::Args;

use crate::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Override the configured listen address
    #[arg(long)]
    pub listen_addr: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("state error: {0}")]
    State(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut state = AppState::load(ctx.config_path.clone())?;
        if let Some(listen_addr) = &self.listen_addr {
            state.config.listen_addr = listen_addr.clone();
        }

        let config = state.service_config()?;
        service::process::spawn_service(&config).await;

        Ok("station stopped".to_string())
    }
}
