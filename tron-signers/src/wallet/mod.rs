mod keystore;
pub use keystore::Keystore;

use crate::{Signer, SignerError};
use async_trait::async_trait;
use std::{fmt, str::FromStr};
use tron_core::{
    k256::ecdsa::SigningKey,
    rand::{CryptoRng, Rng},
    types::{Address, Signature, TxId},
    utils::secret_key_to_address,
};

/// A private-public key pair held in memory, already unlocked.
///
/// # Examples
///
/// ```
/// use tron_core::{rand::thread_rng, utils::sha256};
/// use tron_signers::{Signer, Wallet};
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let wallet = Wallet::new(&mut thread_rng());
///
/// let digest = sha256(b"raw data");
/// let signature = wallet.sign_digest(&digest, &wallet.address()).await?;
/// assert_eq!(signature.recover(&digest)?, wallet.address());
/// # Ok(())
/// # }
/// ```
pub struct Wallet {
    /// The Wallet's private Key
    pub(crate) signer: SigningKey,
    /// The wallet's address
    pub(crate) address: Address,
}

impl Wallet {
    /// Creates a new random keypair seeded with the provided RNG
    pub fn new<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        SigningKey::random(rng).into()
    }

    /// Signs a digest synchronously
    pub fn sign_hash(&self, digest: &TxId) -> Result<Signature, SignerError> {
        Ok(self.signer.sign_prehash_recoverable(digest.as_ref())?.into())
    }

    /// Gets the wallet's signer
    pub fn signer(&self) -> &SigningKey {
        &self.signer
    }

    /// Returns the wallet's address
    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl Signer for Wallet {
    async fn sign_digest(&self, digest: &TxId, address: &Address) -> Result<Signature, SignerError> {
        if address != &self.address {
            return Err(SignerError::KeyNotFound(*address))
        }
        self.sign_hash(digest)
    }

    fn addresses(&self) -> Vec<Address> {
        vec![self.address]
    }
}

impl From<SigningKey> for Wallet {
    fn from(signer: SigningKey) -> Self {
        let address = secret_key_to_address(&signer);

        Self { signer, address }
    }
}

impl FromStr for Wallet {
    type Err = SignerError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let src = src.strip_prefix("0x").unwrap_or(src);
        let bytes = hex::decode(src).map_err(|_| {
            SignerError::EcdsaError(tron_core::k256::ecdsa::Error::new())
        })?;
        Ok(SigningKey::from_slice(&bytes)?.into())
    }
}

impl PartialEq for Wallet {
    fn eq(&self, other: &Self) -> bool {
        self.signer.to_bytes().eq(&other.signer.to_bytes()) && self.address == other.address
    }
}

// do not log the signer
impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet").field("address", &self.address).finish()
    }
}
