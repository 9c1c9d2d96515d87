use serde::{Deserialize, Serialize};
use tron_core::types::{Address, ContractResult, TransactionInfo, TxId};

/// Summary of a resolved execution, for display. Keys serialize in sorted order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    #[serde(rename = "blockNumber")]
    pub block_number: i64,
    /// Base58 address of the first signer
    pub from: String,
    pub message: String,
    pub receipt: ReceiptSummary,
    pub result: ContractResult,
    #[serde(rename = "txID")]
    pub txid: TxId,
}

/// Resource consumption of an execution
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptSummary {
    #[serde(rename = "energyUsage")]
    pub energy_usage: i64,
    pub fee: i64,
    #[serde(rename = "netFee")]
    pub net_fee: i64,
    #[serde(rename = "netUsage")]
    pub net_usage: i64,
}

impl ExecutionReport {
    pub fn new(from: &Address, info: &TransactionInfo) -> Self {
        let result = info.execution_result();
        Self {
            block_number: info.block_number,
            from: from.to_string(),
            message: result.message,
            receipt: ReceiptSummary {
                energy_usage: info.receipt.energy_usage_total,
                fee: info.fee,
                net_fee: info.receipt.net_fee,
                net_usage: info.receipt.net_usage,
            },
            result: result.code,
            txid: info.id,
        }
    }
}
