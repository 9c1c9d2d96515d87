#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
//! # Clients for interacting with Tron full nodes
//!
//! This crate provides the [`Gateway`] abstraction over a node: building unsigned
//! transactions, broadcasting signed ones and fetching execution receipts. The
//! [`Http`] gateway talks to a node's HTTP API, [`MockGateway`] is a scriptable test
//! double.
//!
//! # Examples
//!
//! ```no_run
//! use tron_providers::{ContractParameters, Gateway, Http};
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway: Http = "https://api.shasta.trongrid.io".parse()?;
//!
//! let params = ContractParameters::Transfer {
//!     owner: "TJRabPrwbZy45sbavfcjinPJC18kjpRTv8".parse()?,
//!     to: "TCrDi9etxusgSRpTTWq4hsqPz3y9NnxT4q".parse()?,
//!     amount: 1_000_000,
//! };
//! let tx = gateway.build_transaction(&params).await?;
//! println!("built {}", tx.txid);
//! # Ok(())
//! # }
//! ```
mod contract;
pub use contract::ContractParameters;

mod errors;
pub use errors::GatewayError;

mod transports;
pub use transports::{Http, HttpClientError, MockGateway, MockResponse};

use async_trait::async_trait;
use auto_impl::auto_impl;
use std::fmt::Debug;
use tron_core::types::{BroadcastResult, SignedTransaction, Transaction, TransactionInfo, TxId};

/// A remote node which builds, accepts and reports on transactions.
///
/// Implementations hold no mutable state across calls, so one gateway can be shared by
/// any number of concurrent executions.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait Gateway: Debug + Send + Sync {
    /// Asks the node to build an unsigned transaction. The returned transaction has
    /// already been checked to carry a reproducible digest.
    async fn build_transaction(
        &self,
        params: &ContractParameters,
    ) -> Result<Transaction, GatewayError>;

    /// Submits a signed transaction. A returned [`BroadcastResult`] may still be a
    /// rejection, see [`BroadcastResult::is_accepted`].
    async fn broadcast(&self, tx: &SignedTransaction) -> Result<BroadcastResult, GatewayError>;

    /// Fetches the execution receipt of `txid`, [`GatewayError::NotFound`] when the node
    /// has no receipt for it yet.
    async fn transaction_info(&self, txid: &TxId) -> Result<TransactionInfo, GatewayError>;
}

/// Rejects empty build responses and ones whose digest does not match their raw data.
pub(crate) fn check_built(tx: Transaction) -> Result<Transaction, GatewayError> {
    if tx.raw_data_hex.is_empty() || tx.txid.is_zero() {
        return Err(GatewayError::EmptyResponse)
    }
    tx.verify_digest()?;
    Ok(tx)
}

/// Maps the node's empty receipt to [`GatewayError::NotFound`].
pub(crate) fn check_found(
    info: TransactionInfo,
    txid: &TxId,
) -> Result<TransactionInfo, GatewayError> {
    if info.id.is_zero() {
        return Err(GatewayError::NotFound(*txid))
    }
    Ok(info)
}
