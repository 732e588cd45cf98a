mod support;

use axum::body::Body;
use http::{Request, StatusCode};
use tower::ServiceExt;

use common::crypto::{Identity, PublicKey};
use common::envelope::{Envelope, ENVELOPE_VERSION};

use support::{test_app, test_app_with_chain, MockChain, ACCOUNT_ADDRESS};

/// Seal `body` from `client` for `server_key`, returning the request body
/// and the signature header value
fn seal(client: &Identity, server_key: &PublicKey, body: &[u8]) -> (String, String) {
    let envelope = Envelope::new(client.address(), body.to_vec());
    let sealed = envelope.seal(server_key, client).unwrap();
    let request_body = serde_json::json!({ "secure": sealed.ciphertext }).to_string();
    (request_body, sealed.signature.to_hex())
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Open a sealed response body addressed to `client`, asserting it was
/// signed by `server`
async fn open_secure(
    response: axum::response::Response,
    client: &Identity,
    server: &Identity,
) -> serde_json::Value {
    let signature = response
        .headers()
        .get("x-signature")
        .and_then(|v| v.to_str().ok())
        .map(common::crypto::RecoverableSignature::from_hex)
        .unwrap()
        .unwrap();
    assert!(response.headers().contains_key("x-pubkey"));

    let value = body_json(response).await;
    assert_eq!(value["response_type"], "secure");

    let envelope = Envelope::open(
        value["secure"].as_str().unwrap(),
        &signature,
        client,
        chrono::Utc::now().timestamp(),
    )
    .unwrap();
    assert_eq!(envelope.address, server.address());
    serde_json::from_slice(&envelope.data).unwrap()
}

#[tokio::test]
async fn test_status_routes_skip_auth() {
    let (app, _) = test_app();

    let response = app
        .oneshot(
            Request::get("/_status/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let value = body_json(response).await;
    assert_eq!(value["status"], "ok");
}

#[tokio::test]
async fn test_identity_route_publishes_server_key() {
    let (app, server) = test_app();

    let response = app
        .oneshot(
            Request::get("/_status/identity")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let value = body_json(response).await;
    assert_eq!(
        value["address"].as_str().unwrap(),
        server.address().to_hex()
    );
    assert_eq!(
        value["public_key"].as_str().unwrap(),
        server.public().to_hex()
    );
}

#[tokio::test]
async fn test_missing_pubkey_is_unauthorized() {
    let (app, _) = test_app();

    let response = app
        .oneshot(Request::get("/hello").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let value = body_json(response).await;
    assert_eq!(value["error"], "unauthorized");
}

#[tokio::test]
async fn test_hello_seals_for_caller() {
    let (app, server) = test_app();
    let client = Identity::generate();

    let response = app
        .oneshot(
            Request::get("/hello")
                .header("x-pubkey", client.public().to_hex())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = open_secure(response, &client, &server).await;
    assert_eq!(body["name"], "Base Sepolia");
    assert_eq!(body["chain_id"], 84532);
    assert_eq!(body["address"].as_str().unwrap(), server.address().to_hex());
    assert_eq!(body["paymaster_balance"], "1.5");
}

#[tokio::test]
async fn test_sealed_push_round_trip() {
    let (app, server) = test_app();
    let client = Identity::generate();

    let payload = serde_json::json!({ "token": "push-token-1" }).to_string();
    let (request_body, signature) = seal(&client, server.public(), payload.as_bytes());

    let response = app
        .clone()
        .oneshot(
            Request::put("/push/associate")
                .header("x-pubkey", client.public().to_hex())
                .header("x-signature", signature)
                .header("content-type", "application/json")
                .body(Body::from(request_body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::get("/push/list")
                .header("x-pubkey", client.public().to_hex())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = open_secure(response, &client, &server).await;
    assert_eq!(body["tokens"], serde_json::json!(["push-token-1"]));
}

#[tokio::test]
async fn test_account_creation_returns_plain_address() {
    let (app, server) = test_app();
    let client = Identity::generate();

    let (request_body, signature) = seal(&client, server.public(), b"{}");

    let response = app
        .oneshot(
            Request::post("/community/account")
                .header("x-pubkey", client.public().to_hex())
                .header("x-signature", signature)
                .header("content-type", "application/json")
                .body(Body::from(request_body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let value = body_json(response).await;
    assert_eq!(value["response_type"], "object");
    assert_eq!(value["object"]["address"].as_str().unwrap(), ACCOUNT_ADDRESS);
}

#[tokio::test]
async fn test_profile_creation_returns_plain_address() {
    let client = Identity::generate();
    let (app, server) = test_app_with_chain(MockChain {
        owner: client.address(),
    });

    let payload = serde_json::json!({ "account": ACCOUNT_ADDRESS }).to_string();
    let (request_body, signature) = seal(&client, server.public(), payload.as_bytes());

    let response = app
        .oneshot(
            Request::post("/community/profile")
                .header("x-pubkey", client.public().to_hex())
                .header("x-signature", signature)
                .header("content-type", "application/json")
                .body(Body::from(request_body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let value = body_json(response).await;
    assert_eq!(value["response_type"], "object");
    assert_eq!(value["object"]["address"].as_str().unwrap(), ACCOUNT_ADDRESS);
}

#[tokio::test]
async fn test_profile_for_foreign_account_is_unauthorized() {
    // the mock chain reports a zero owner, which never matches the caller
    let (app, server) = test_app();
    let client = Identity::generate();

    let payload = serde_json::json!({ "account": ACCOUNT_ADDRESS }).to_string();
    let (request_body, signature) = seal(&client, server.public(), payload.as_bytes());

    let response = app
        .oneshot(
            Request::post("/community/profile")
                .header("x-pubkey", client.public().to_hex())
                .header("x-signature", signature)
                .header("content-type", "application/json")
                .body(Body::from(request_body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let value = body_json(response).await;
    assert_eq!(value["error"], "unauthorized");
}

#[tokio::test]
async fn test_voucher_listing_returns_plain_array() {
    let (app, _) = test_app();
    let client = Identity::generate();

    let response = app
        .oneshot(
            Request::get(format!("/community/voucher?owner={ACCOUNT_ADDRESS}").as_str())
                .header("x-pubkey", client.public().to_hex())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let value = body_json(response).await;
    assert_eq!(value["response_type"], "array");

    let transfers = value["objects"].as_array().unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0]["to"].as_str().unwrap(), ACCOUNT_ADDRESS);
    assert!(transfers[0]["value"].as_str().unwrap().ends_with("05"));
}

#[tokio::test]
async fn test_rejections_are_uniform() {
    let (app, server) = test_app();
    let client = Identity::generate();

    // expired envelope: stamped in the past, otherwise well formed
    let expired = Envelope {
        version: ENVELOPE_VERSION,
        expiry: chrono::Utc::now().timestamp() - 60,
        address: client.address(),
        data: b"{}".to_vec(),
    };
    let sealed = expired.seal(server.public(), &client).unwrap();
    let expired_body = serde_json::json!({ "secure": sealed.ciphertext }).to_string();
    let expired_sig = sealed.signature.to_hex();

    // fresh envelope whose signature comes from a different key
    let intruder = Identity::generate();
    let fresh = Envelope::new(client.address(), b"{}".to_vec());
    let hash = fresh.hash().unwrap();
    let forged_sig = intruder.sign(&hash).unwrap().to_hex();
    let forged_body = serde_json::json!({
        "secure": fresh.seal(server.public(), &client).unwrap().ciphertext
    })
    .to_string();

    let mut bodies = Vec::new();
    for (body, sig) in [(expired_body, expired_sig), (forged_body, forged_sig)] {
        let response = app
            .clone()
            .oneshot(
                Request::post("/community/account")
                    .header("x-pubkey", client.public().to_hex())
                    .header("x-signature", sig)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        bodies.push(bytes);
    }

    // every rejection reads the same from the outside
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn test_garbage_body_is_bad_request() {
    let (app, server) = test_app();
    let client = Identity::generate();
    let (_, signature) = seal(&client, server.public(), b"{}");

    let response = app
        .oneshot(
            Request::post("/community/account")
                .header("x-pubkey", client.public().to_hex())
                .header("x-signature", signature)
                .header("content-type", "application/json")
                .body(Body::from("not json at all"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let value = body_json(response).await;
    assert_eq!(value["error"], "bad request");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _) = test_app();
    let client = Identity::generate();

    let response = app
        .oneshot(
            Request::get("/nope")
                .header("x-pubkey", client.public().to_hex())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
