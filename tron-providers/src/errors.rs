use thiserror::Error;
use tron_core::types::{TransactionError, TxId};

#[derive(Debug, Error)]
/// An error thrown when talking to a node
pub enum GatewayError {
    /// Thrown if the HTTP request failed, including on timeout
    #[error(transparent)]
    HTTPError(#[from] reqwest::Error),

    /// The node answered with something which is not the expected JSON
    #[error("Deserialization Error: {err}. Response: {text}")]
    SerdeJson { err: serde_json::Error, text: String },

    /// The node refused the request, e.g. a contract validation failure on build
    #[error("node error {code}: {message}")]
    Node { code: String, message: String },

    /// The node returned an empty transaction
    #[error("node returned an empty response")]
    EmptyResponse,

    /// The built transaction failed local checks
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// No receipt for the transaction yet
    #[error("no receipt for transaction {0}")]
    NotFound(TxId),

    /// The endpoint could not be joined with the node url
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// A transport outside this crate failed
    #[error("{0}")]
    CustomError(String),
}

impl GatewayError {
    /// `true` for the "not yet included" answer
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }
}
