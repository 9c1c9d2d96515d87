use std::{path::Path, time::Duration};
use tron_core::{
    k256::ecdsa::SigningKey,
    types::{Address, Transaction},
    utils::secret_key_to_address,
};
use tron_middleware::ControllerOptions;
use tron_providers::{ContractParameters, MockGateway};

mod scenarios;

mod signatures;

/// Options with small bounds, for tests on a paused clock.
pub fn options() -> ControllerOptions {
    ControllerOptions::default()
        .sign_timeout(Duration::from_secs(30))
        .broadcast_timeout(Duration::from_secs(5))
        .poll_timeout(Duration::from_secs(30))
        .poll_interval(Duration::from_secs(3))
}

/// A transfer owned by `owner`, built the way the node would.
pub fn transfer(owner: Address) -> Transaction {
    let params = ContractParameters::Transfer { owner, to: Address::from_hash([0x22; 20]), amount: 1_000_000 };
    MockGateway::transaction(&params, 1)
}

pub fn key() -> (SigningKey, Address) {
    let key = SigningKey::random(&mut rand::thread_rng());
    let address = secret_key_to_address(&key);
    (key, address)
}

/// Stores a fresh key in `dir` under `password`.
pub fn store_key(dir: &Path, password: &str) -> Address {
    let (key, address) = key();
    eth_keystore::encrypt_key(
        dir,
        &mut rand::thread_rng(),
        key.to_bytes(),
        password,
        Some(&address.to_string()),
    )
    .unwrap();
    address
}
