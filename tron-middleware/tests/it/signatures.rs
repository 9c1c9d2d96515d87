use crate::{key, options, transfer};
use async_trait::async_trait;
use std::time::Duration;
use tron_core::{
    k256::ecdsa::SigningKey,
    types::{Address, ContractResult, Signature, SignatureError, TransactionError, TxId},
};
use tron_middleware::{ControllerError, ControllerState, TransactionController};
use tron_providers::MockGateway;
use tron_signers::{Signer, SignerError, Wallet};

/// Holds several keys, like a multi-signature wallet on one machine.
#[derive(Debug)]
struct Keyring(Vec<Wallet>);

#[async_trait]
impl Signer for Keyring {
    async fn sign_digest(&self, digest: &TxId, address: &Address) -> Result<Signature, SignerError> {
        let wallet = self
            .0
            .iter()
            .find(|wallet| wallet.address() == *address)
            .ok_or(SignerError::KeyNotFound(*address))?;
        wallet.sign_digest(digest, address).await
    }

    fn addresses(&self) -> Vec<Address> {
        self.0.iter().map(Wallet::address).collect()
    }
}

/// Signs every request with the same key, whoever it is for.
#[derive(Debug)]
struct Impostor(SigningKey);

#[async_trait]
impl Signer for Impostor {
    async fn sign_digest(&self, digest: &TxId, _: &Address) -> Result<Signature, SignerError> {
        Ok(self.0.sign_prehash_recoverable(digest.as_ref())?.into())
    }

    fn addresses(&self) -> Vec<Address> {
        Vec::new()
    }
}

/// An in-memory key that takes a minute to produce anything.
#[derive(Debug)]
struct Sluggish(Wallet);

#[async_trait]
impl Signer for Sluggish {
    async fn sign_digest(&self, digest: &TxId, address: &Address) -> Result<Signature, SignerError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        self.0.sign_digest(digest, address).await
    }

    fn addresses(&self) -> Vec<Address> {
        self.0.addresses()
    }
}

fn keyring(n: usize) -> Keyring {
    Keyring((0..n).map(|_| Wallet::new(&mut rand::thread_rng())).collect())
}

#[tokio::test(start_paused = true)]
async fn broadcast_carries_one_signature_per_required_signer() {
    for n in 1..=5 {
        let keyring = keyring(n);
        let signers = keyring.addresses();
        let gateway = MockGateway::new();
        let tx = transfer(signers[0]);
        gateway.set_receipt(MockGateway::receipt(tx.txid, ContractResult::SUCCESS));

        let mut controller = TransactionController::new(&gateway, &keyring, tx, options())
            .unwrap()
            .with_signers(signers.clone())
            .unwrap();
        controller.execute().await.unwrap();

        let signed = controller.signed_transaction().unwrap();
        assert!(signed.is_complete());
        assert_eq!(signed.signatures().count(), n);
        assert_eq!(gateway.broadcasted()[0]["signature"].as_array().unwrap().len(), n);
    }
}

#[tokio::test(start_paused = true)]
async fn missing_key_for_one_of_many_signers_never_broadcasts() {
    let keyring = keyring(3);
    let mut signers = keyring.addresses();
    let (_, outsider) = key();
    signers.push(outsider);
    let gateway = MockGateway::new();

    let mut controller = TransactionController::new(&gateway, &keyring, transfer(signers[0]), options())
        .unwrap()
        .with_signers(signers)
        .unwrap();
    let err = controller.execute().await.unwrap_err();

    assert!(matches!(err, ControllerError::Signing { address, .. } if address == outsider));
    assert_eq!(controller.signed_transaction().unwrap().signatures().count(), 3);
    assert!(!controller.signed_transaction().unwrap().is_complete());
    assert!(gateway.broadcasted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn signature_from_wrong_key_is_rejected_locally() {
    let (_, owner) = key();
    let (impostor_key, impostor) = key();
    let signer = Impostor(impostor_key);
    let gateway = MockGateway::new();

    let mut controller =
        TransactionController::new(&gateway, &signer, transfer(owner), options()).unwrap();
    let err = controller.execute().await.unwrap_err();

    assert!(matches!(
        err,
        ControllerError::SignatureMismatch {
            address,
            source: TransactionError::Signature(SignatureError::VerificationError(expected, recovered)),
        } if address == owner && expected == owner && recovered == impostor
    ));
    assert_eq!(err.step(), ControllerState::Built);
    assert!(gateway.broadcasted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_local_signer_reports_sign_timeout() {
    let wallet = Wallet::new(&mut rand::thread_rng());
    let owner = wallet.address();
    let signer = Sluggish(wallet);
    let gateway = MockGateway::new();
    let opts = options();

    let mut controller = TransactionController::new(&gateway, &signer, transfer(owner), opts).unwrap();
    let err = controller.execute().await.unwrap_err();

    assert!(matches!(
        err,
        ControllerError::Signing { address, source: SignerError::DeviceTimeout(t) }
            if address == owner && t == opts.sign_timeout
    ));
    assert_eq!(controller.state(), ControllerState::Failed);
    assert!(gateway.broadcasted().is_empty());
}
