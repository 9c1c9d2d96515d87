use crate::{check_built, check_found, ContractParameters, Gateway, GatewayError};

use async_trait::async_trait;
use reqwest::{header::HeaderValue, Client};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::{fmt::Debug, str::FromStr, time::Duration};
use thiserror::Error;
use tron_core::types::{
    serde_helpers::decode_node_message, BroadcastResult, SignedTransaction, Transaction,
    TransactionInfo, TxId,
};
use url::Url;

/// Header carrying the API key of hosted node providers
pub const API_KEY_HEADER: &str = "TRON-PRO-API-KEY";

/// Bound on a single request unless overridden with [`Provider::with_timeout`]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A client for a full node's HTTP API.
///
/// # Example
///
/// ```no_run
/// use tron_providers::{Gateway, Http};
/// use std::time::Duration;
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway = Http::new_with_api_key(
///     url::Url::parse("https://api.trongrid.io")?,
///     "my-api-key",
/// )?
/// .with_timeout(Duration::from_secs(10));
/// let info = gateway.transaction_info(&"77ddfa7093cc5f745c0d3a54abb89ef070f983343c05e0f89e5a52f3e5401299".parse()?).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Provider {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Http {{ url: {}, timeout: {:?} }}", self.url, self.timeout)
    }
}

#[derive(Error, Debug)]
/// Error thrown when setting up an HTTP client
pub enum ClientError {
    /// Thrown if unable to build headers for client
    #[error(transparent)]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Thrown if unable to build client
    #[error(transparent)]
    ClientBuild(#[from] reqwest::Error),
}

impl Provider {
    /// Initializes a new HTTP client
    ///
    /// # Example
    ///
    /// ```
    /// use tron_providers::Http;
    /// use url::Url;
    ///
    /// let url = Url::parse("http://localhost:8090").unwrap();
    /// let gateway = Http::new(url);
    /// ```
    pub fn new(url: impl Into<Url>) -> Self {
        Self::new_with_client(url, Client::new())
    }

    /// Initializes a client which sends `api_key` with every request
    pub fn new_with_api_key(url: impl Into<Url>, api_key: &str) -> Result<Self, ClientError> {
        let mut value = HeaderValue::from_str(api_key)?;
        value.set_sensitive(true);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(API_KEY_HEADER, value);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self::new_with_client(url, client))
    }

    /// Allows to customize the gateway by providing your own http client
    pub fn new_with_client(url: impl Into<Url>, client: reqwest::Client) -> Self {
        Self { client, url: url.into(), timeout: DEFAULT_TIMEOUT }
    }

    /// Bounds every request by `timeout`
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The bound applied to every request
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The Url to which requests are made
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Vec<u8>, GatewayError> {
        let url = self.url.join(path)?;
        let request = self.client.post(url).json(body).timeout(self.timeout);
        tracing::trace!(path, "sending request");

        let res = request.send().await?.error_for_status()?;
        Ok(res.bytes().await?.to_vec())
    }

    async fn post_json<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, GatewayError> {
        let body = self.post(path, body).await?;
        decode(&body)
    }
}

fn decode<R: DeserializeOwned>(body: &[u8]) -> Result<R, GatewayError> {
    serde_json::from_slice(body).map_err(|err| GatewayError::SerdeJson {
        err,
        text: String::from_utf8_lossy(body).to_string(),
    })
}

/// Parses the node's answer to a build request.
///
/// Failures come back as `{"Error": "..."}` or as a `result` object with a non-success
/// code and a hex encoded message.
pub(crate) fn parse_build_response(body: &[u8]) -> Result<Transaction, GatewayError> {
    let value: Value = decode(body)?;

    if let Some(message) = value.get("Error").and_then(Value::as_str) {
        return Err(GatewayError::Node { code: "Error".to_string(), message: message.to_string() })
    }
    if let Some(code) = value.pointer("/result/code").and_then(Value::as_str) {
        if code != "SUCCESS" {
            let message = value
                .pointer("/result/message")
                .and_then(Value::as_str)
                .map(decode_node_message)
                .unwrap_or_default();
            return Err(GatewayError::Node { code: code.to_string(), message })
        }
    }
    if value.get("txID").is_none() {
        return Err(GatewayError::EmptyResponse)
    }

    let tx = serde_json::from_value(value)
        .map_err(|err| GatewayError::SerdeJson { err, text: String::from_utf8_lossy(body).to_string() })?;
    check_built(tx)
}

#[async_trait]
impl Gateway for Provider {
    async fn build_transaction(
        &self,
        params: &ContractParameters,
    ) -> Result<Transaction, GatewayError> {
        let mut body = params.to_value();
        body["visible"] = Value::Bool(false);
        let response = self.post(params.endpoint(), &body).await?;
        parse_build_response(&response)
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<BroadcastResult, GatewayError> {
        self.post_json("wallet/broadcasttransaction", tx).await
    }

    async fn transaction_info(&self, txid: &TxId) -> Result<TransactionInfo, GatewayError> {
        let info = self.post_json("wallet/gettransactioninfobyid", &json!({ "value": txid })).await?;
        check_found(info, txid)
    }
}

impl FromStr for Provider {
    type Err = url::ParseError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(src)?;
        Ok(Provider::new(url))
    }
}
