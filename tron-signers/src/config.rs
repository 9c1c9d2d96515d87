//! Explicit selection of the signing backend.
use crate::{
    ledger::{app::LedgerTron, transport::DeviceTransport, types::DerivationType},
    Keystore, Signer, SignerError, Wallet,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};
use tron_core::types::{Address, Signature, Transaction, TxId};

/// How long a device may take to answer a signing request, user confirmation included.
pub const DEFAULT_DEVICE_TIMEOUT: Duration = Duration::from_secs(120);

/// Which signer to use, deserializable from a config file.
///
/// ```
/// use tron_signers::SignerConfig;
///
/// let config: SignerConfig = serde_json::from_str(
///     r#"{ "type": "ledger", "paths": ["0", "m/44'/195'/0'/0/1"], "timeout_ms": 60000 }"#,
/// ).unwrap();
/// assert!(matches!(config, SignerConfig::Ledger { .. }));
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignerConfig {
    /// Passphrase protected keys in a directory
    Keystore { dir: PathBuf, passphrase: String },
    /// An interactive signing device
    Ledger {
        /// Ledger Live account indices or full derivation paths
        paths: Vec<String>,
        /// Round trip bound for a single signature, in milliseconds
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
}

impl SignerConfig {
    /// Builds the configured signer. Device signers need an open `transport`.
    pub async fn into_signer<T: DeviceTransport>(
        self,
        transport: Option<T>,
    ) -> Result<AnySigner<T>, SignerError> {
        match self {
            SignerConfig::Keystore { dir, passphrase } => {
                Ok(AnySigner::Keystore(Keystore::new(dir, passphrase)))
            }
            SignerConfig::Ledger { paths, timeout_ms } => {
                let transport = transport.ok_or_else(|| {
                    SignerError::DeviceNotConnected("no device transport available".to_string())
                })?;
                let timeout =
                    timeout_ms.map(Duration::from_millis).unwrap_or(DEFAULT_DEVICE_TIMEOUT);
                let derivations = paths.iter().map(|path| derivation(path)).collect();
                Ok(AnySigner::Ledger(LedgerTron::new(transport, derivations, timeout).await?))
            }
        }
    }
}

#[cfg(feature = "ledger")]
impl SignerConfig {
    /// Builds the configured signer, opening the first USB device if one is needed.
    pub async fn connect(
        self,
    ) -> Result<AnySigner<crate::ledger::transport::HidTransport>, SignerError> {
        let transport = match self {
            SignerConfig::Ledger { .. } => {
                Some(crate::ledger::transport::HidTransport::connect().await?)
            }
            SignerConfig::Keystore { .. } => None,
        };
        self.into_signer(transport).await
    }
}

fn derivation(path: &str) -> DerivationType {
    match path.parse::<usize>() {
        Ok(index) => DerivationType::LedgerLive(index),
        Err(_) => DerivationType::Other(path.to_string()),
    }
}

impl std::fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignerConfig::Keystore { dir, .. } => {
                f.debug_struct("Keystore").field("dir", dir).finish_non_exhaustive()
            }
            SignerConfig::Ledger { paths, timeout_ms } => f
                .debug_struct("Ledger")
                .field("paths", paths)
                .field("timeout_ms", timeout_ms)
                .finish(),
        }
    }
}

/// One of the supported signers
#[derive(Debug)]
pub enum AnySigner<T> {
    /// Unlocked in-memory key
    Wallet(Wallet),
    /// Passphrase protected key directory
    Keystore(Keystore),
    /// Interactive device
    Ledger(LedgerTron<T>),
}

impl<T> From<Wallet> for AnySigner<T> {
    fn from(src: Wallet) -> Self {
        AnySigner::Wallet(src)
    }
}

impl<T> From<Keystore> for AnySigner<T> {
    fn from(src: Keystore) -> Self {
        AnySigner::Keystore(src)
    }
}

impl<T> From<LedgerTron<T>> for AnySigner<T> {
    fn from(src: LedgerTron<T>) -> Self {
        AnySigner::Ledger(src)
    }
}

#[async_trait]
impl<T: DeviceTransport> Signer for AnySigner<T> {
    async fn sign_digest(&self, digest: &TxId, address: &Address) -> Result<Signature, SignerError> {
        match self {
            AnySigner::Wallet(signer) => signer.sign_digest(digest, address).await,
            AnySigner::Keystore(signer) => signer.sign_digest(digest, address).await,
            AnySigner::Ledger(signer) => signer.sign_digest(digest, address).await,
        }
    }

    async fn sign_transaction(
        &self,
        tx: &Transaction,
        address: &Address,
    ) -> Result<Signature, SignerError> {
        match self {
            AnySigner::Wallet(signer) => signer.sign_transaction(tx, address).await,
            AnySigner::Keystore(signer) => signer.sign_transaction(tx, address).await,
            AnySigner::Ledger(signer) => signer.sign_transaction(tx, address).await,
        }
    }

    fn addresses(&self) -> Vec<Address> {
        match self {
            AnySigner::Wallet(signer) => signer.addresses(),
            AnySigner::Keystore(signer) => signer.addresses(),
            AnySigner::Ledger(signer) => Signer::addresses(signer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::mock::MockDevice;
    use tron_core::{k256::ecdsa::SigningKey, utils::secret_key_to_address};

    #[test]
    fn parses_keystore_config() {
        let config: SignerConfig = serde_json::from_str(
            r#"{ "type": "keystore", "dir": "/tmp/keys", "passphrase": "hunter2" }"#,
        )
        .unwrap();
        assert_eq!(
            config,
            SignerConfig::Keystore { dir: "/tmp/keys".into(), passphrase: "hunter2".into() }
        );
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn parses_paths() {
        assert_eq!(derivation("3"), DerivationType::LedgerLive(3));
        assert_eq!(
            derivation("m/44'/195'/0'/0/1"),
            DerivationType::Other("m/44'/195'/0'/0/1".to_string())
        );
    }

    #[tokio::test]
    async fn ledger_without_transport_is_not_connected() {
        let config = SignerConfig::Ledger { paths: vec!["0".into()], timeout_ms: None };
        let err = config.into_signer::<MockDevice>(None).await.unwrap_err();
        assert!(matches!(err, SignerError::DeviceNotConnected(_)));
    }

    #[tokio::test]
    async fn builds_ledger_signer() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = secret_key_to_address(&key);
        let device = MockDevice::new().with_account(DerivationType::LedgerLive(0), key);

        let config = SignerConfig::Ledger { paths: vec!["0".into()], timeout_ms: Some(5_000) };
        let signer = config.into_signer(Some(device)).await.unwrap();
        assert_eq!(signer.addresses(), vec![address]);
        match signer {
            AnySigner::Ledger(ledger) => assert_eq!(ledger.timeout, Duration::from_secs(5)),
            other => panic!("unexpected signer {other:?}"),
        }
    }
}
