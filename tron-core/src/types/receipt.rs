use super::serde_helpers::deserialize_node_message;
use crate::types::TxId;
use serde::{Deserialize, Serialize};

/// Result codes of the virtual machine, as reported in a receipt.
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum ContractResult {
    /// System contracts that never enter the VM
    #[default]
    DEFAULT,
    SUCCESS,
    REVERT,
    BAD_JUMP_DESTINATION,
    OUT_OF_MEMORY,
    PRECOMPILED_CONTRACT,
    STACK_TOO_SMALL,
    STACK_TOO_LARGE,
    ILLEGAL_OPERATION,
    STACK_OVERFLOW,
    OUT_OF_ENERGY,
    OUT_OF_TIME,
    JVM_STACK_OVER_FLOW,
    UNKNOWN,
    TRANSFER_FAILED,
    INVALID_CODE,
    /// Any code this client does not know about
    #[serde(other)]
    UNRECOGNIZED,
}

impl ContractResult {
    /// Whether a receipt carrying this code is final. `UNKNOWN` and unrecognized codes
    /// are treated as not yet resolved.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ContractResult::UNKNOWN | ContractResult::UNRECOGNIZED)
    }

    /// Whether the code denotes successful execution.
    pub fn is_success(&self) -> bool {
        matches!(self, ContractResult::DEFAULT | ContractResult::SUCCESS)
    }
}

/// Top level outcome code of a receipt. Note the node's spelling of `SUCESS`.
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum InfoCode {
    #[default]
    #[serde(alias = "SUCCESS")]
    SUCESS,
    FAILED,
}

/// Bandwidth and energy accounting of an executed transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReceipt {
    #[serde(default)]
    pub energy_usage: i64,
    #[serde(default)]
    pub energy_fee: i64,
    #[serde(default)]
    pub origin_energy_usage: i64,
    #[serde(default)]
    pub energy_usage_total: i64,
    #[serde(default)]
    pub net_usage: i64,
    #[serde(default)]
    pub net_fee: i64,
    #[serde(default)]
    pub result: ContractResult,
}

/// The execution receipt of an included transaction.
///
/// Nodes answer with an empty object for unknown transactions, which deserializes to
/// a zero `id` and no block number.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
    #[serde(default)]
    pub id: TxId,
    /// Total fee charged, in sun
    #[serde(default)]
    pub fee: i64,
    #[serde(rename = "blockNumber", default)]
    pub block_number: i64,
    #[serde(rename = "blockTimeStamp", default)]
    pub block_timestamp: i64,
    #[serde(rename = "contractResult", default)]
    pub contract_result: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub receipt: ResourceReceipt,
    #[serde(default)]
    pub result: InfoCode,
    #[serde(rename = "resMessage", default, deserialize_with = "deserialize_node_message")]
    pub res_message: String,
}

impl TransactionInfo {
    /// Whether this receipt is a final answer for `txid`: the identifiers match, the
    /// transaction is in a block and the VM code is on the terminal allowlist.
    pub fn is_terminal_for(&self, txid: &TxId) -> bool {
        &self.id == txid && self.block_number > 0 && self.receipt.result.is_terminal()
    }

    /// The execution outcome. A reverted contract is a successful resolution with a
    /// failing result.
    pub fn execution_result(&self) -> ExecutionResult {
        let success = self.result == InfoCode::SUCESS && self.receipt.result.is_success();
        let message = if self.res_message.is_empty() {
            self.receipt.result.to_string()
        } else {
            self.res_message.clone()
        };
        ExecutionResult { success, code: self.receipt.result, message }
    }
}

/// The final outcome handed back to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub code: ContractResult,
    pub message: String,
}
