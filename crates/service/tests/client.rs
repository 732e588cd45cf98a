mod support;

use axum::routing::get;
use axum::{Json, Router};

use common::crypto::{Address, Identity};
use service::http::client::{ClientError, SecureClient};
use service::http::handlers::hello::HelloResponse;

/// Serve `app` on an ephemeral local port and return its base url
async fn serve(app: Router) -> url::Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    url::Url::parse(&format!("http://{addr}/")).unwrap()
}

#[tokio::test]
async fn test_client_round_trip_against_live_server() {
    let (app, server) = support::test_app();
    let remote = serve(app).await;

    let client = SecureClient::connect(remote, Identity::generate())
        .await
        .unwrap();
    assert_eq!(client.server_address(), server.address());

    // a safe request: the answer comes back sealed and is opened transparently
    let hello: HelloResponse = client.get("hello").await.unwrap();
    assert_eq!(hello.name, "Base Sepolia");
    assert_eq!(hello.chain_id, 84532);
    assert_eq!(hello.address, server.address());

    // a sealed request: the body travels encrypted, the answer is plain
    let created: serde_json::Value = client
        .post("community/account", &serde_json::json!({}))
        .await
        .unwrap();
    assert_eq!(
        created["address"].as_str().unwrap(),
        support::ACCOUNT_ADDRESS
    );
}

#[tokio::test]
async fn test_connect_refuses_inconsistent_identity() {
    // a station publishing a key that does not derive its claimed address
    let identity = Identity::generate();
    let published = serde_json::json!({
        "address": Address::from([7u8; 20]).to_hex(),
        "public_key": identity.public().to_hex(),
    });
    let app = Router::new().route(
        "/_status/identity",
        get(move || {
            let published = published.clone();
            async move { Json(published) }
        }),
    );
    let remote = serve(app).await;

    let result = SecureClient::connect(remote, Identity::generate()).await;
    assert!(matches!(result, Err(ClientError::ServerAddressMismatch)));
}
