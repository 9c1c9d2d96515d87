#![cfg_attr(docsrs, feature(doc_cfg))]
//! Tron types, cryptography and utilities.
//!
//! This library provides type definitions for the data flowing between a client and a
//! Tron full node: addresses, transactions and their digests, recoverable signatures,
//! broadcast acknowledgements and execution receipts.
//!
//! ## Recovering a signer
//!
//! A transaction is identified by the SHA-256 digest of its raw bytes. Signatures are
//! produced directly over that digest, and the signer's address can be recovered from
//! the signature.
//!
//! ```rust
//! use tron_core::{k256::ecdsa::SigningKey, types::Signature, utils::{secret_key_to_address, sha256}};
//!
//! let key = SigningKey::random(&mut rand::thread_rng());
//! let digest = sha256(b"raw transaction bytes");
//!
//! let (sig, recid) = key.sign_prehash_recoverable(digest.as_ref()).unwrap();
//! let signature = Signature::from((sig, recid));
//! assert_eq!(signature.recover(&digest).unwrap(), secret_key_to_address(&key));
//! ```
pub mod types;

/// Various utilities
pub mod utils;

// re-export rand to avoid potential confusion when there's rand version mismatches
pub use rand;

// re-export k256
pub use k256;
