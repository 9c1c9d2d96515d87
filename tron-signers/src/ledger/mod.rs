pub mod app;
pub mod mock;
pub mod transport;
pub mod types;

use crate::{Signer, SignerError};
use app::LedgerTron;
use async_trait::async_trait;
use std::future::Future;
use transport::DeviceTransport;
use tron_core::types::{Address, Signature, Transaction, TxId};
use types::LedgerError;

impl From<LedgerError> for SignerError {
    fn from(src: LedgerError) -> Self {
        if src.is_user_rejection() {
            SignerError::UserRejected
        } else if src.is_disconnected() {
            SignerError::DeviceNotConnected(src.to_string())
        } else {
            SignerError::Device(src)
        }
    }
}

impl<T: DeviceTransport> LedgerTron<T> {
    fn account(&self, address: &Address) -> Result<&types::DerivationType, SignerError> {
        self.derivation_of(address).ok_or(SignerError::KeyNotFound(*address))
    }

    // Bounds a device round trip by the session timeout
    async fn bounded<F>(&self, request: F) -> Result<Signature, SignerError>
    where
        F: Future<Output = Result<Signature, LedgerError>> + Send,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result.map_err(SignerError::from),
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "device did not answer in time");
                Err(SignerError::DeviceTimeout(self.timeout))
            }
        }
    }
}

#[async_trait]
impl<T: DeviceTransport> Signer for LedgerTron<T> {
    /// Signs the digest only; the device displays the hash
    async fn sign_digest(&self, digest: &TxId, address: &Address) -> Result<Signature, SignerError> {
        let derivation = self.account(address)?;
        self.bounded(self.sign_hash(digest, derivation)).await
    }

    /// Sends the full transaction so the user can review it on the device
    async fn sign_transaction(
        &self,
        tx: &Transaction,
        address: &Address,
    ) -> Result<Signature, SignerError> {
        let derivation = self.account(address)?;
        tracing::debug!(%address, path = %derivation, "waiting for confirmation on device");
        self.bounded(self.sign_tx(tx, derivation)).await
    }

    fn addresses(&self) -> Vec<Address> {
        LedgerTron::addresses(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        mock::{Approval, MockDevice},
        types::DerivationType,
        *,
    };
    use std::time::Duration;
    use tron_core::{k256::ecdsa::SigningKey, utils::secret_key_to_address};

    async fn ledger(device: MockDevice) -> LedgerTron<MockDevice> {
        LedgerTron::new(device, vec![DerivationType::LedgerLive(0)], Duration::from_secs(30))
            .await
            .unwrap()
    }

    fn device() -> (MockDevice, Address) {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = secret_key_to_address(&key);
        (MockDevice::new().with_account(DerivationType::LedgerLive(0), key), address)
    }

    #[tokio::test]
    async fn approved_signature_recovers() {
        let (device, address) = device();
        let ledger = ledger(device).await;
        let digest = TxId([7; 32]);

        let signature = ledger.sign_digest(&digest, &address).await.unwrap();
        signature.verify(&digest, &address).unwrap();
    }

    #[tokio::test]
    async fn rejection_maps_to_user_rejected() {
        let (device, address) = device();
        device.push_approval(Approval::Reject);
        let ledger = ledger(device).await;

        let err = ledger.sign_digest(&TxId([7; 32]), &address).await.unwrap_err();
        assert!(matches!(err, SignerError::UserRejected));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_device_times_out() {
        let (device, address) = device();
        device.push_approval(Approval::Stall);
        let ledger = ledger(device).await;

        let err = ledger.sign_digest(&TxId([7; 32]), &address).await.unwrap_err();
        assert!(matches!(err, SignerError::DeviceTimeout(d) if d == Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn unplugged_device_is_not_connected() {
        let (device, address) = device();
        let ledger = ledger(device.clone()).await;
        device.disconnect();

        let err = ledger.sign_digest(&TxId([7; 32]), &address).await.unwrap_err();
        assert!(matches!(err, SignerError::DeviceNotConnected(_)));
    }

    #[tokio::test]
    async fn unknown_address_is_key_not_found() {
        let (device, _) = device();
        let ledger = ledger(device).await;
        let stranger = Address::from_hash([3; 20]);

        let err = ledger.sign_digest(&TxId([7; 32]), &stranger).await.unwrap_err();
        assert!(matches!(err, SignerError::KeyNotFound(addr) if addr == stranger));
    }
}
