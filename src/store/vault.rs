//! Vault KV version 2 client.
//!
//! Only the metadata endpoints of the engine are used: listing keys, and
//! reading or writing the custom metadata of a secret.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::StoreError;
use crate::models::CustomMetadata;

use super::SecretStore;

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

/// Connection settings for a KV v2 mount.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Base address of the server, e.g. `https://vault.example.com:8200`.
    pub address: String,
    pub token: String,
    /// Enterprise namespace, sent with every request when set.
    pub namespace: Option<String>,
    /// Mount path of the KV v2 engine.
    pub mount: String,
}

impl VaultConfig {
    pub fn new(
        address: impl Into<String>,
        token: impl Into<String>,
        mount: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
            namespace: None,
            mount: mount.into(),
        }
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }
}

pub struct VaultStore {
    client: Client,
    base: Url,
    config: VaultConfig,
}

#[derive(Deserialize)]
struct SecretBody {
    data: Option<Value>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

impl VaultStore {
    pub fn new(config: VaultConfig) -> Result<Self, StoreError> {
        Self::with_client(Client::builder().build()?, config)
    }

    pub fn with_client(client: Client, config: VaultConfig) -> Result<Self, StoreError> {
        let invalid = |reason: String| StoreError::InvalidAddress {
            address: config.address.clone(),
            reason,
        };
        let base = Url::parse(&config.address).map_err(|err| invalid(err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a hierarchical URL".to_owned()));
        }

        Ok(Self {
            client,
            base,
            config,
        })
    }

    /// URL of the metadata endpoint for `path`, one encoded segment per path
    /// component. A trailing separator survives as an empty last segment.
    fn metadata_url(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("v1");
            segments.extend(self.config.mount.split('/').filter(|s| !s.is_empty()));
            segments.push("metadata");
            segments.extend(path.trim_start_matches('/').split('/'));
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(TOKEN_HEADER, &self.config.token);
        match &self.config.namespace {
            Some(namespace) => request.header(NAMESPACE_HEADER, namespace),
            None => request,
        }
    }

    /// Decode the `data` object of a successful response, `None` on 404 or an
    /// empty body.
    async fn read_data(response: Response) -> Result<Option<Value>, StoreError> {
        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => return Ok(None),
            status if !status.is_success() => return Err(status_error(response).await),
            _ => {}
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let body: SecretBody = serde_json::from_slice(&bytes)?;
        Ok(body.data.filter(|data| !data.is_null()))
    }
}

async fn status_error(response: Response) -> StoreError {
    let status = response.status();
    if status == StatusCode::FORBIDDEN {
        return StoreError::Forbidden;
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .map(|body| body.errors.join("; "))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_owned());

    StoreError::Status {
        status: status.as_u16(),
        message,
    }
}

fn parse_keys(data: &Value) -> Result<Vec<String>, StoreError> {
    let keys = data
        .get("keys")
        .and_then(Value::as_array)
        .ok_or_else(|| StoreError::Malformed {
            reason: "secret metadata did not contain the expected keys".to_owned(),
        })?;

    keys.iter()
        .map(|key| {
            key.as_str()
                .map(str::to_owned)
                .ok_or_else(|| StoreError::Malformed {
                    reason: format!("retrieved secret key that is not a string: {key}"),
                })
        })
        .collect()
}

fn parse_custom_metadata(data: &Value) -> Result<CustomMetadata, StoreError> {
    match data.get("custom_metadata") {
        None | Some(Value::Null) => Ok(CustomMetadata::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(StoreError::Malformed {
            reason: format!("custom_metadata is not an object: {other}"),
        }),
    }
}

#[async_trait]
impl SecretStore for VaultStore {
    async fn list_children(&self, path: &str) -> Result<Option<Vec<String>>, StoreError> {
        let url = self.metadata_url(path);
        debug!(%url, "listing keys");

        let response = self
            .authorize(self.client.get(url).query(&[("list", "true")]))
            .send()
            .await?;

        match Self::read_data(response).await? {
            Some(data) => parse_keys(&data).map(Some),
            None => Ok(None),
        }
    }

    async fn read_custom_metadata(
        &self,
        path: &str,
    ) -> Result<Option<CustomMetadata>, StoreError> {
        let url = self.metadata_url(path);
        debug!(%url, "reading metadata");

        let response = self.authorize(self.client.get(url)).send().await?;

        match Self::read_data(response).await? {
            Some(data) => parse_custom_metadata(&data).map(Some),
            None => Ok(None),
        }
    }

    async fn write_custom_metadata(
        &self,
        path: &str,
        metadata: CustomMetadata,
    ) -> Result<(), StoreError> {
        let url = self.metadata_url(path);
        debug!(%url, "writing metadata");

        let response = self
            .authorize(self.client.post(url))
            .json(&json!({ "custom_metadata": metadata }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error(response).await)
        }
    }
}
