#![cfg_attr(docsrs, feature(doc_cfg))]
//! Provides a unified interface for signing transactions.
//!
//! You can implement the `Signer` trait to extend functionality to other signers
//! such as Hardware Security Modules, KMS etc.
//!
//! The exposed interfaces return a recoverable signature over the transaction digest.
//! Attaching signatures to a transaction and broadcasting it is done by the
//! transaction controller.
//!
//! Supported signers:
//! - Private key held in memory ([`Wallet`])
//! - Passphrase protected keystore directory ([`Keystore`])
//! - Ledger ([`Ledger`])
//!
//! ```no_run
//! # use tron_signers::{Keystore, Signer};
//! # use tron_core::types::{Address, TxId};
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let keystore = Keystore::new("./keystore", "correct horse battery staple");
//! let owner: Address = "TJRabPrwbZy45sbavfcjinPJC18kjpRTv8".parse()?;
//!
//! // the key is decrypted for this call only
//! let digest: TxId = "77ddfa7093cc5f745c0d3a54abb89ef070f983343c05e0f89e5a52f3e5401299".parse()?;
//! let signature = keystore.sign_digest(&digest, &owner).await?;
//! signature.verify(&digest, &owner)?;
//! # Ok(())
//! # }
//! ```
mod wallet;
pub use wallet::{Keystore, Wallet};

mod ledger;
pub use ledger::{
    app::LedgerTron as Ledger,
    mock::{Approval, MockDevice},
    transport::{ApduAnswer, ApduCommand, DeviceTransport},
    types::{DerivationType as HDPath, LedgerError},
};
#[cfg(feature = "ledger")]
pub use ledger::transport::HidTransport;

mod config;
pub use config::{AnySigner, SignerConfig, DEFAULT_DEVICE_TIMEOUT};

use async_trait::async_trait;
use std::{fmt, time::Duration};
use thiserror::Error;
use tron_core::types::{Address, Signature, Transaction, TxId};

#[derive(Error, Debug)]
/// Error thrown by any signer
pub enum SignerError {
    /// No key is stored for the requested address
    #[error("no key found for {0}")]
    KeyNotFound(Address),
    /// The passphrase failed to decrypt the stored key
    #[error("invalid passphrase for {0}")]
    InvalidPassphrase(Address),
    /// The signing device is unreachable, locked or the app is not open
    #[error("signing device is not connected: {0}")]
    DeviceNotConnected(String),
    /// The user rejected the request on the device
    #[error("signature request was rejected on the device")]
    UserRejected,
    /// The device did not answer in time. Also raised by the transaction controller
    /// when any signer outlives its signing bound.
    #[error("device did not answer within {0:?}")]
    DeviceTimeout(Duration),
    /// Any other device protocol failure
    #[error(transparent)]
    Device(LedgerError),
    /// Underlying keystore error (I/O, malformed file)
    #[error(transparent)]
    Keystore(#[from] eth_keystore::KeystoreError),
    /// Error propagated from k256's ECDSA module
    #[error(transparent)]
    EcdsaError(#[from] tron_core::k256::ecdsa::Error),
}

/// Trait for signing transactions
///
/// Implement this trait to support different signing modes, e.g. Ledger, hosted etc.
/// A signer may hold several identities; every call names the address to sign for.
#[async_trait]
pub trait Signer: fmt::Debug + Send + Sync {
    /// Signs a transaction digest on behalf of `address`
    async fn sign_digest(&self, digest: &TxId, address: &Address) -> Result<Signature, SignerError>;

    /// Signs the transaction on behalf of `address`. Defaults to signing its digest.
    async fn sign_transaction(
        &self,
        tx: &Transaction,
        address: &Address,
    ) -> Result<Signature, SignerError> {
        self.sign_digest(&tx.digest(), address).await
    }

    /// Returns the addresses this signer can sign for
    fn addresses(&self) -> Vec<Address>;
}
