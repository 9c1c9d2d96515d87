use crate::{key, options, store_key, transfer};
use tempfile::tempdir;
use tokio::time::Instant;
use tron_core::types::{BroadcastResult, ContractResult, ResponseCode};
use tron_middleware::{ControllerError, ControllerState, ErrorKind, TransactionController};
use tron_providers::{GatewayError, MockGateway, MockResponse};
use tron_signers::{Approval, HDPath, Keystore, Ledger, MockDevice, SignerError};

#[tokio::test(start_paused = true)]
async fn keystore_signer_resolves_successfully() {
    let dir = tempdir().unwrap();
    let owner = store_key(dir.path(), "passw0rd");
    let keystore = Keystore::new(dir.path(), "passw0rd");
    let gateway = MockGateway::new();
    let tx = transfer(owner);
    gateway.set_receipt(MockGateway::receipt(tx.txid, ContractResult::SUCCESS));

    let mut controller = TransactionController::new(&gateway, &keystore, tx, options()).unwrap();
    let result = controller.execute().await.unwrap();

    assert!(result.success);
    assert_eq!(controller.state(), ControllerState::Resolved);
    assert!(controller.broadcast_result().unwrap().is_accepted());
    assert_eq!(controller.receipt().unwrap().block_number, 48_000_000);

    let broadcasted = gateway.broadcasted();
    assert_eq!(broadcasted.len(), 1);
    assert_eq!(broadcasted[0]["signature"].as_array().unwrap().len(), 1);

    let report = controller.report().unwrap();
    assert_eq!(report.from, owner.to_string());
    assert_eq!(report.result, ContractResult::SUCCESS);
}

#[tokio::test(start_paused = true)]
async fn wrong_passphrase_never_broadcasts() {
    let dir = tempdir().unwrap();
    let owner = store_key(dir.path(), "passw0rd");
    let keystore = Keystore::new(dir.path(), "password");
    let gateway = MockGateway::new();

    let mut controller =
        TransactionController::new(&gateway, &keystore, transfer(owner), options()).unwrap();
    let err = controller.execute().await.unwrap_err();

    assert!(matches!(
        err,
        ControllerError::Signing { source: SignerError::InvalidPassphrase(addr), .. } if addr == owner
    ));
    assert_eq!(err.kind(), ErrorKind::Signing);
    assert_eq!(controller.state(), ControllerState::Failed);
    assert!(gateway.broadcasted().is_empty());
    assert!(controller.broadcast_result().is_none());
}

#[tokio::test(start_paused = true)]
async fn broadcast_rejection_is_surfaced_verbatim() {
    let (key, owner) = key();
    let wallet = tron_signers::Wallet::from(key);
    let gateway = MockGateway::new();
    gateway.push_broadcast(MockResponse::Value(
        serde_json::from_str::<BroadcastResult>(
            // "account resource insufficient error."
            r#"{"code":"BANDWITH_ERROR","message":"6163636f756e74207265736f7572636520696e73756666696369656e74206572726f722e"}"#,
        )
        .unwrap(),
    ));

    let mut controller =
        TransactionController::new(&gateway, &wallet, transfer(owner), options()).unwrap();
    let err = controller.execute().await.unwrap_err();

    match &err {
        ControllerError::BroadcastRejected { code, message } => {
            assert_eq!(*code, ResponseCode::BANDWITH_ERROR);
            assert_eq!(message, "account resource insufficient error.");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.step(), ControllerState::Signed);
    assert_eq!(gateway.info_requests(), 0);
    assert!(!controller.broadcast_result().unwrap().is_accepted());
    assert!(controller.receipt().is_none());
}

#[tokio::test(start_paused = true)]
async fn silent_broadcast_is_bounded_by_broadcast_timeout() {
    let (key, owner) = key();
    let wallet = tron_signers::Wallet::from(key);
    let gateway = MockGateway::new();
    gateway.push_broadcast(MockResponse::Stall);
    let opts = options();

    let mut controller = TransactionController::new(&gateway, &wallet, transfer(owner), opts).unwrap();
    let start = Instant::now();
    let err = controller.execute().await.unwrap_err();

    assert!(start.elapsed() >= opts.broadcast_timeout);
    assert!(start.elapsed() < opts.broadcast_timeout * 2);
    assert!(matches!(err, ControllerError::BroadcastTimeout(t) if t == opts.broadcast_timeout));
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.step(), ControllerState::Signed);
    assert_eq!(controller.state(), ControllerState::Failed);
    assert!(controller.signed_transaction().unwrap().is_complete());
    assert!(controller.broadcast_result().is_none());
    assert_eq!(gateway.info_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn broadcast_transport_failure_is_not_a_rejection() {
    let (key, owner) = key();
    let wallet = tron_signers::Wallet::from(key);
    let gateway = MockGateway::new();
    gateway.push_broadcast(MockResponse::Error("connection reset".to_string()));

    let mut controller =
        TransactionController::new(&gateway, &wallet, transfer(owner), options()).unwrap();
    let err = controller.execute().await.unwrap_err();

    assert!(matches!(
        &err,
        ControllerError::Gateway(GatewayError::CustomError(msg)) if msg == "connection reset"
    ));
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(controller.state(), ControllerState::Failed);
    assert!(controller.broadcast_result().is_none());
    assert!(controller.receipt().is_none());
    assert_eq!(gateway.info_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn missing_receipt_times_out() {
    let (key, owner) = key();
    let wallet = tron_signers::Wallet::from(key);
    let gateway = MockGateway::new();
    let opts = options();

    let mut controller = TransactionController::new(&gateway, &wallet, transfer(owner), opts).unwrap();
    let start = Instant::now();
    let err = controller.execute().await.unwrap_err();

    assert!(start.elapsed() <= opts.poll_timeout + opts.broadcast_timeout);
    assert!(matches!(
        err,
        ControllerError::ConfirmationTimeout { txid, last_error: None, .. } if txid == controller.txid()
    ));
    assert_eq!(err.kind(), ErrorKind::ConfirmationTimeout);
    assert_eq!(controller.state(), ControllerState::Failed);
    // the transaction may still land
    assert!(controller.broadcast_result().unwrap().is_accepted());
    assert!(gateway.info_requests() > 1);
}

#[tokio::test(start_paused = true)]
async fn device_rejection_after_first_signature() {
    let (first_key, first) = key();
    let (second_key, second) = key();
    let device = MockDevice::new()
        .with_account(HDPath::LedgerLive(0), first_key)
        .with_account(HDPath::LedgerLive(1), second_key);
    device.push_approval(Approval::Approve);
    device.push_approval(Approval::Reject);
    let ledger = Ledger::new(
        device.clone(),
        vec![HDPath::LedgerLive(0), HDPath::LedgerLive(1)],
        options().sign_timeout,
    )
    .await
    .unwrap();
    let gateway = MockGateway::new();

    let mut controller = TransactionController::new(&gateway, &ledger, transfer(first), options())
        .unwrap()
        .with_signers([first, second])
        .unwrap();
    let err = controller.execute().await.unwrap_err();

    assert!(matches!(
        err,
        ControllerError::Signing { address, source: SignerError::UserRejected } if address == second
    ));
    assert_eq!(device.sign_requests(), 2);
    assert_eq!(controller.signed_transaction().unwrap().signatures().count(), 1);
    assert!(gateway.broadcasted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn reverted_execution_is_a_resolution() {
    let (key, owner) = key();
    let wallet = tron_signers::Wallet::from(key);
    let gateway = MockGateway::new();
    let tx = transfer(owner);
    let mut receipt = MockGateway::receipt(tx.txid, ContractResult::REVERT);
    receipt.res_message = "REVERT opcode executed".to_string();
    gateway.set_receipt(receipt);

    let mut controller = TransactionController::new(&gateway, &wallet, tx, options()).unwrap();
    let result = controller.execute().await.unwrap();

    assert!(!result.success);
    assert_eq!(result.code, ContractResult::REVERT);
    assert_eq!(result.message, "REVERT opcode executed");
    assert_eq!(controller.state(), ControllerState::Resolved);
}

#[tokio::test(start_paused = true)]
async fn stalled_device_is_bounded_by_sign_timeout() {
    let (device_key, owner) = key();
    let device = MockDevice::new().with_account(HDPath::LedgerLive(0), device_key);
    device.push_approval(Approval::Stall);
    // the device bound is looser than the controller's
    let ledger = Ledger::new(device, vec![HDPath::LedgerLive(0)], options().sign_timeout * 10)
        .await
        .unwrap();
    let gateway = MockGateway::new();

    let mut controller =
        TransactionController::new(&gateway, &ledger, transfer(owner), options()).unwrap();
    let start = Instant::now();
    let err = controller.execute().await.unwrap_err();

    let elapsed = start.elapsed();
    assert!(elapsed >= options().sign_timeout);
    assert!(elapsed < options().sign_timeout * 2);
    assert!(matches!(
        err,
        ControllerError::Signing { source: SignerError::DeviceTimeout(t), .. } if t == options().sign_timeout
    ));
}
