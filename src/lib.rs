#![cfg_attr(docsrs, feature(doc_cfg))]
//! # tron-rs
//!
//! A library for getting transactions on a Tron network signed, broadcast and
//! confirmed.
//!
//! ## Quickstart: `prelude`
//!
//! A prelude is provided which imports all the important things for you.
//!
//! ```no_run
//! use tron::prelude::*;
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway: Http = "https://api.shasta.trongrid.io".parse()?;
//! let wallet: Wallet = "0000000000000000000000000000000000000000000000000000000000000001".parse()?;
//!
//! let params = ContractParameters::Transfer {
//!     owner: wallet.address(),
//!     to: "TCrDi9etxusgSRpTTWq4hsqPz3y9NnxT4q".parse()?,
//!     amount: 1_000_000,
//! };
//! let tx = gateway.build_transaction(&params).await?;
//!
//! let mut controller =
//!     TransactionController::new(&gateway, &wallet, tx, ControllerOptions::default())?;
//! let result = controller.execute().await?;
//! assert!(result.success);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: addresses, transactions, signatures and receipts
//! - [`signers`]: the [`Signer`](signers::Signer) trait with in-memory, keystore and
//!   Ledger implementations
//! - [`providers`]: the [`Gateway`](providers::Gateway) to a full node
//! - [`middleware`]: the transaction controller and receipt resolver

#[doc(inline)]
pub use tron_core as core;

#[doc(inline)]
pub use tron_middleware as middleware;

#[doc(inline)]
pub use tron_providers as providers;

#[doc(inline)]
pub use tron_signers as signers;

/// Easy imports of frequently used type definitions and traits.
#[doc(hidden)]
pub mod prelude {
    pub use super::core::types::*;

    pub use super::middleware::*;

    pub use super::providers::*;

    pub use super::signers::*;
}
