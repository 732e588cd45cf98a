use axum::routing::{get, post};
use axum::Router;

pub mod account;
pub mod config;
pub mod op;
pub mod profile;
pub mod voucher;

use crate::ServiceState;

pub fn router() -> Router<ServiceState> {
    Router::new()
        .route("/config", get(config::handler))
        .route("/account", post(account::handler))
        .route("/profile", post(profile::handler))
        .route("/op", post(op::handler))
        .route("/voucher", get(voucher::list).post(voucher::mint))
}
