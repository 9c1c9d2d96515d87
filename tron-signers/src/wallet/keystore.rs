use super::Wallet;
use crate::{Signer, SignerError};
use async_trait::async_trait;
use eth_keystore::KeystoreError;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};
use tron_core::{
    k256::ecdsa::SigningKey,
    types::{Address, Signature, TxId},
};

/// A directory of passphrase-protected keys.
///
/// Each key lives in its own encrypted JSON file named after the base58 address it
/// controls. Keys are decrypted right before signing and dropped as soon as the
/// signature is produced.
///
/// Decryption runs scrypt synchronously on the calling task. It blocks the executor
/// thread while it runs and a surrounding `tokio::time::timeout` only fires once it
/// has returned.
#[derive(Clone)]
pub struct Keystore {
    dir: PathBuf,
    passphrase: String,
}

impl Keystore {
    /// Points at a keystore directory. Nothing is read until a key is needed.
    pub fn new(dir: impl Into<PathBuf>, passphrase: impl Into<String>) -> Self {
        Self { dir: dir.into(), passphrase: passphrase.into() }
    }

    /// The keystore directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, address: &Address) -> PathBuf {
        self.dir.join(address.to_string())
    }

    /// Decrypts the key for `address` into an unlocked [`Wallet`]
    pub fn unlock(&self, address: &Address) -> Result<Wallet, SignerError> {
        let path = self.key_path(address);
        if !path.is_file() {
            return Err(SignerError::KeyNotFound(*address))
        }

        let secret = eth_keystore::decrypt_key(&path, &self.passphrase).map_err(|err| match err {
            KeystoreError::MacMismatch => SignerError::InvalidPassphrase(*address),
            err => SignerError::Keystore(err),
        })?;
        let wallet = Wallet::from(SigningKey::from_slice(&secret)?);

        // a file named after one address holding another key is treated as missing
        if wallet.address != *address {
            tracing::warn!(%address, found = %wallet.address, "keystore file holds a different key");
            return Err(SignerError::KeyNotFound(*address))
        }
        Ok(wallet)
    }
}

#[async_trait]
impl Signer for Keystore {
    async fn sign_digest(&self, digest: &TxId, address: &Address) -> Result<Signature, SignerError> {
        let wallet = self.unlock(address)?;
        tracing::trace!(%address, "unlocked keystore key");
        wallet.sign_hash(digest)
    }

    /// Lists the addresses with a key file in the directory. Unreadable directories
    /// and files not named after an address are skipped.
    fn addresses(&self) -> Vec<Address> {
        let Ok(entries) = fs::read_dir(&self.dir) else { return Vec::new() };
        let mut addresses: Vec<Address> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().and_then(|name| name.parse().ok()))
            .collect();
        addresses.sort();
        addresses
    }
}

// do not log the passphrase
impl fmt::Debug for Keystore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keystore").field("dir", &self.dir).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tron_core::utils::{secret_key_to_address, sha256};

    fn store(dir: &Path, password: &str) -> Address {
        let mut rng = rand::thread_rng();
        let key = SigningKey::random(&mut rng);
        let address = secret_key_to_address(&key);
        eth_keystore::encrypt_key(
            dir,
            &mut rng,
            key.to_bytes(),
            password,
            Some(&address.to_string()),
        )
        .unwrap();
        address
    }

    #[tokio::test]
    async fn signs_with_decrypted_key() {
        let dir = tempdir().unwrap();
        let address = store(dir.path(), "randpsswd");
        let keystore = Keystore::new(dir.path(), "randpsswd");

        let digest = sha256(b"raw");
        let signature = keystore.sign_digest(&digest, &address).await.unwrap();
        signature.verify(&digest, &address).unwrap();
        assert_eq!(keystore.addresses(), vec![address]);
    }

    #[tokio::test]
    async fn wrong_passphrase() {
        let dir = tempdir().unwrap();
        let address = store(dir.path(), "randpsswd");
        let keystore = Keystore::new(dir.path(), "not it");

        let err = keystore.sign_digest(&sha256(b"raw"), &address).await.unwrap_err();
        assert!(matches!(err, SignerError::InvalidPassphrase(addr) if addr == address));
    }

    #[tokio::test]
    async fn missing_key() {
        let dir = tempdir().unwrap();
        store(dir.path(), "randpsswd");
        let keystore = Keystore::new(dir.path(), "randpsswd");
        let other = Address::from_hash([9; 20]);

        let err = keystore.sign_digest(&sha256(b"raw"), &other).await.unwrap_err();
        assert!(matches!(err, SignerError::KeyNotFound(addr) if addr == other));
    }

    #[test]
    fn construction_does_no_io() {
        let keystore = Keystore::new("/does/not/exist", "hunter2");
        assert!(keystore.addresses().is_empty());
        assert!(!format!("{keystore:?}").contains("hunter2"));
    }
}
