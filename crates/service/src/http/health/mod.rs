use axum::routing::get;
use axum::Router;

use crate::ServiceState;

mod healthz;
mod identity;
mod version;

pub use identity::IdentityResponse;

pub fn router() -> Router<ServiceState> {
    Router::new()
        .route("/healthz", get(healthz::handler))
        .route("/version", get(version::handler))
        .route("/identity", get(identity::handler))
}
