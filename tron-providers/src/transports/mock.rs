use crate::{check_built, check_found, ContractParameters, Gateway, GatewayError};
use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};
use tron_core::{
    types::{
        BroadcastResult, Contract, ContractParameter, ContractResult, InfoCode, RawData,
        ResourceReceipt, SignedTransaction, Transaction, TransactionInfo, TxId,
    },
    utils::sha256,
};

/// A scripted answer of the [`MockGateway`].
#[derive(Clone, Debug)]
pub enum MockResponse<T> {
    /// Successful response
    Value(T),
    /// Transport failure with the given message
    Error(String),
    /// The node never answers
    Stall,
}

#[derive(Debug, Default)]
struct MockState {
    builds: VecDeque<MockResponse<Transaction>>,
    broadcasts: VecDeque<MockResponse<BroadcastResult>>,
    infos: VecDeque<MockResponse<TransactionInfo>>,
    receipt: Option<TransactionInfo>,
    broadcasted: Vec<Value>,
    build_requests: usize,
    info_requests: usize,
}

#[derive(Clone, Debug, Default)]
/// Gateway double used in test environments.
///
/// Responses are queued per call. When a queue is empty the gateway behaves like a
/// healthy node: builds synthesize a consistent transaction, broadcasts are accepted
/// and receipts come from [`MockGateway::set_receipt`] or are not found.
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    /// Instantiates a mock gateway
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an answer to the next build request
    pub fn push_build(&self, response: MockResponse<Transaction>) {
        self.state.lock().unwrap().builds.push_back(response);
    }

    /// Queues an answer to the next broadcast
    pub fn push_broadcast(&self, response: MockResponse<BroadcastResult>) {
        self.state.lock().unwrap().broadcasts.push_back(response);
    }

    /// Queues an answer to the next receipt request
    pub fn push_info(&self, response: MockResponse<TransactionInfo>) {
        self.state.lock().unwrap().infos.push_back(response);
    }

    /// The receipt returned once the receipt queue is drained
    pub fn set_receipt(&self, receipt: TransactionInfo) {
        self.state.lock().unwrap().receipt = Some(receipt);
    }

    /// The wire form of every broadcast transaction, oldest first
    pub fn broadcasted(&self) -> Vec<Value> {
        self.state.lock().unwrap().broadcasted.clone()
    }

    pub fn build_requests(&self) -> usize {
        self.state.lock().unwrap().build_requests
    }

    pub fn info_requests(&self) -> usize {
        self.state.lock().unwrap().info_requests
    }

    /// A transaction for `params` with a consistent digest. `nonce` varies the raw data.
    pub fn transaction(params: &ContractParameters, nonce: u64) -> Transaction {
        let raw_data = RawData {
            contract: vec![Contract {
                contract_type: params.contract_type(),
                parameter: ContractParameter { value: params.to_value(), type_url: params.type_url() },
                permission_id: None,
            }],
            ref_block_bytes: format!("{:04x}", nonce & 0xffff),
            ref_block_hash: "a1b2c3d4e5f60718".to_string(),
            expiration: 1_650_000_060_000 + nonce as i64,
            timestamp: 1_650_000_000_000 + nonce as i64,
            fee_limit: None,
            data: None,
        };
        // stands in for the protobuf encoding
        let raw_data_hex = serde_json::to_vec(&raw_data).unwrap();
        Transaction { txid: sha256(&raw_data_hex), raw_data, raw_data_hex, visible: false }
    }

    /// A terminal receipt for `txid` with the given VM result
    pub fn receipt(txid: TxId, result: ContractResult) -> TransactionInfo {
        let success = matches!(result, ContractResult::SUCCESS | ContractResult::DEFAULT);
        TransactionInfo {
            id: txid,
            fee: 1_100_000,
            block_number: 48_000_000,
            block_timestamp: 1_650_000_003_000,
            receipt: ResourceReceipt {
                energy_usage_total: 29_650,
                net_usage: 345,
                net_fee: 1_100_000,
                result,
                ..Default::default()
            },
            result: if success { InfoCode::SUCESS } else { InfoCode::FAILED },
            ..Default::default()
        }
    }
}

async fn answer<T>(response: MockResponse<T>) -> Result<T, GatewayError> {
    match response {
        MockResponse::Value(value) => Ok(value),
        MockResponse::Error(message) => Err(GatewayError::CustomError(message)),
        MockResponse::Stall => std::future::pending().await,
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn build_transaction(
        &self,
        params: &ContractParameters,
    ) -> Result<Transaction, GatewayError> {
        let response = {
            let mut state = self.state.lock().unwrap();
            state.build_requests += 1;
            let nonce = state.build_requests as u64;
            state
                .builds
                .pop_front()
                .unwrap_or_else(|| MockResponse::Value(Self::transaction(params, nonce)))
        };
        check_built(answer(response).await?)
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<BroadcastResult, GatewayError> {
        let response = {
            let mut state = self.state.lock().unwrap();
            state.broadcasted.push(serde_json::to_value(tx).unwrap());
            state.broadcasts.pop_front().unwrap_or_else(|| {
                MockResponse::Value(BroadcastResult {
                    result: true,
                    txid: Some(tx.txid()),
                    ..Default::default()
                })
            })
        };
        answer(response).await
    }

    async fn transaction_info(&self, txid: &TxId) -> Result<TransactionInfo, GatewayError> {
        let response = {
            let mut state = self.state.lock().unwrap();
            state.info_requests += 1;
            match state.infos.pop_front() {
                Some(response) => response,
                None => MockResponse::Value(state.receipt.clone().unwrap_or_default()),
            }
        };
        check_found(answer(response).await?, txid)
    }
}
