#![cfg_attr(docsrs, feature(doc_cfg))]
//! # Transaction execution
//!
//! A transaction built by a node goes through three steps before its outcome is known:
//!
//! - it is signed by every required signer, each signature verified locally,
//! - the signed transaction is broadcast, which only tells whether the node accepted
//!   it into its pool,
//! - its receipt is fetched once it lands in a block, which tells whether the contract
//!   executed successfully.
//!
//! The [`TransactionController`] drives these steps against any
//! [`Gateway`](tron_providers::Gateway) with any [`Signer`](tron_signers::Signer), and
//! the [`ReceiptResolver`] implements the last one on its own.
mod controller;
pub use controller::{ControllerState, TransactionController};

mod error;
pub use error::{ControllerError, ErrorKind};

mod options;
pub use options::ControllerOptions;

mod report;
pub use report::{ExecutionReport, ReceiptSummary};

mod resolver;
pub use resolver::ReceiptResolver;
