use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use common::crypto::{Address, Identity, PublicKey, RecoverableSignature};
use common::envelope::{Envelope, EnvelopeError};

use super::auth::{SecureBody, PUBKEY_HEADER, SIGNATURE_HEADER};
use super::health::IdentityResponse;
use super::responder::ApiResponse;

/// Errors that can occur talking to a station
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("http status {0}: {1}")]
    HttpStatus(reqwest::StatusCode, String),
    #[error("malformed response: {0}")]
    Malformed(anyhow::Error),
    #[error("response is missing the {0} header")]
    MissingHeader(&'static str),
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),
    #[error("sealed response was not sent by the station we connected to")]
    ServerAddressMismatch,
}

/// Client side of the secure envelope protocol
///
/// Learns the station's identity once at connect time, then seals request
/// bodies for the station and opens sealed responses, refusing anything not
/// signed by the address it connected to.
#[derive(Debug, Clone)]
pub struct SecureClient {
    remote: Url,
    client: reqwest::Client,
    identity: Identity,
    server_key: PublicKey,
    server_address: Address,
}

impl SecureClient {
    /// Fetch the station's identity and bind this client to it
    pub async fn connect(remote: Url, identity: Identity) -> Result<Self, ClientError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("content-type", HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()?;

        let url = join(&remote, "_status/identity")?;
        let response = client.get(url).send().await?;
        let server: IdentityResponse = success_json(response).await?;

        // refuse stations whose published key does not derive their address
        if Address::from(&server.public_key) != server.address {
            return Err(ClientError::ServerAddressMismatch);
        }

        Ok(Self {
            remote,
            client,
            identity,
            server_key: server.public_key,
            server_address: server.address,
        })
    }

    /// The station address this client is bound to
    pub fn server_address(&self) -> Address {
        self.server_address
    }

    /// GET a protected route; no body to seal, but the response may be
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ClientError> {
        let response = self
            .client
            .get(join(&self.remote, path)?)
            .header(PUBKEY_HEADER, self.identity.public().to_hex())
            .send()
            .await?;
        self.open_response(response).await
    }

    /// POST a sealed body to a protected route
    pub async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, ClientError> {
        self.send_sealed(reqwest::Method::POST, path, body).await
    }

    /// PUT a sealed body to a protected route
    pub async fn put<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, ClientError> {
        self.send_sealed(reqwest::Method::PUT, path, body).await
    }

    /// DELETE with a sealed body on a protected route
    pub async fn delete<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, ClientError> {
        self.send_sealed(reqwest::Method::DELETE, path, body).await
    }

    async fn send_sealed<T: Serialize, R: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &T,
    ) -> Result<R, ClientError> {
        let data = serde_json::to_vec(body).map_err(|e| ClientError::Malformed(e.into()))?;
        let envelope = Envelope::new(self.identity.address(), data);
        let sealed = envelope.seal(&self.server_key, &self.identity)?;

        let response = self
            .client
            .request(method, join(&self.remote, path)?)
            .header(PUBKEY_HEADER, self.identity.public().to_hex())
            .header(SIGNATURE_HEADER, sealed.signature.to_hex())
            .json(&SecureBody {
                secure: sealed.ciphertext,
            })
            .send()
            .await?;
        self.open_response(response).await
    }

    /// Unwrap a tagged response body, opening it if the station sealed it
    async fn open_response<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<R, ClientError> {
        let signature = response
            .headers()
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(RecoverableSignature::from_hex)
            .transpose()
            .map_err(|e| ClientError::Malformed(e.into()))?;

        let body: ApiResponse = success_json(response).await?;
        let value = match body {
            ApiResponse::Object { object } => object,
            ApiResponse::Array { objects } => objects,
            ApiResponse::Secure { secure } => {
                let signature = signature.ok_or(ClientError::MissingHeader(SIGNATURE_HEADER))?;
                let envelope = Envelope::open(
                    &secure,
                    &signature,
                    &self.identity,
                    Utc::now().timestamp(),
                )?;
                if envelope.address != self.server_address {
                    return Err(ClientError::ServerAddressMismatch);
                }
                serde_json::from_slice(&envelope.data)
                    .map_err(|e| ClientError::Malformed(e.into()))?
            }
        };

        serde_json::from_value(value).map_err(|e| ClientError::Malformed(e.into()))
    }
}

fn join(base: &Url, path: &str) -> Result<Url, ClientError> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| ClientError::Malformed(e.into()))
}

async fn success_json<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ClientError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::HttpStatus(status, body));
    }
    Ok(response.json().await?)
}
