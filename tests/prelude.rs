use std::time::Duration;
use tron::prelude::*;

#[tokio::test(start_paused = true)]
async fn transfer_through_the_facade() {
    let gateway = MockGateway::new();
    let wallet = Wallet::new(&mut rand::thread_rng());
    let params = ContractParameters::Transfer {
        owner: wallet.address(),
        to: Address::from_hash([0x33; 20]),
        amount: 10,
    };

    let tx = gateway.build_transaction(&params).await.unwrap();
    gateway.set_receipt(MockGateway::receipt(tx.txid, ContractResult::SUCCESS));

    let options = ControllerOptions::default().poll_interval(Duration::from_millis(500));
    let mut controller = TransactionController::new(&gateway, &wallet, tx, options).unwrap();
    let result = controller.execute().await.unwrap();

    assert!(result.success);
    assert_eq!(controller.report().unwrap().from, wallet.address().to_string());
}
