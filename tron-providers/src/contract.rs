use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tron_core::types::{Address, ContractType};

/// The parameters of a contract to build a transaction for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContractParameters {
    /// Sends `amount` SUN from `owner` to `to`
    Transfer { owner: Address, to: Address, amount: u64 },
    /// Adds (or withdraws) `owner`'s approval of a network proposal
    ProposalApprove { owner: Address, proposal_id: u64, approve: bool },
}

impl ContractParameters {
    /// The account the contract executes on behalf of
    pub fn owner(&self) -> Address {
        match self {
            ContractParameters::Transfer { owner, .. } => *owner,
            ContractParameters::ProposalApprove { owner, .. } => *owner,
        }
    }

    pub fn contract_type(&self) -> ContractType {
        match self {
            ContractParameters::Transfer { .. } => ContractType::TransferContract,
            ContractParameters::ProposalApprove { .. } => ContractType::ProposalApproveContract,
        }
    }

    /// The node's HTTP endpoint which builds this contract
    pub fn endpoint(&self) -> &'static str {
        match self {
            ContractParameters::Transfer { .. } => "wallet/createtransaction",
            ContractParameters::ProposalApprove { .. } => "wallet/proposalapprove",
        }
    }

    /// The contract fields as the node expects them, with hex addresses
    pub fn to_value(&self) -> Value {
        match self {
            ContractParameters::Transfer { owner, to, amount } => json!({
                "owner_address": owner.to_hex(),
                "to_address": to.to_hex(),
                "amount": amount,
            }),
            ContractParameters::ProposalApprove { owner, proposal_id, approve } => json!({
                "owner_address": owner.to_hex(),
                "proposal_id": proposal_id,
                "is_add_approval": approve,
            }),
        }
    }

    /// The protobuf type url the node wraps the fields in
    pub fn type_url(&self) -> String {
        format!("type.googleapis.com/protocol.{}", self.contract_type())
    }
}
