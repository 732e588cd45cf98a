use axum::extract::State;
use axum::response::Response;

use crate::http::auth::Caller;
use crate::http::responder::ResponderError;
use crate::ServiceState;

/// Export the community address book, sealed for the caller
pub async fn handler(
    State(state): State<ServiceState>,
    caller: Caller,
) -> Result<Response, ResponderError> {
    let address = state.community().export_address();
    state.responder().secure(&caller, address)
}
