//! Transaction types
use super::serde_helpers::hex_bytes;
use crate::{
    types::{Address, Signature, SignatureError, TxId},
    utils::sha256,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error involving a transaction or its signatures.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The advertised `txID` is not the digest of `raw_data_hex`
    #[error("transaction id {advertised} does not match digest {computed} of its raw data")]
    DigestMismatch {
        /// `txID` as returned by the node
        advertised: TxId,
        /// sha256 of the raw data bytes
        computed: TxId,
    },
    /// The transaction carries no contract
    #[error("transaction has no contract")]
    EmptyContract,
    /// A contract's parameter has no usable `owner_address`
    #[error("contract parameter is missing a valid owner_address")]
    MissingOwner,
    /// The signature was produced by an address which is not required to sign
    #[error("{0} is not a required signer of this transaction")]
    UnexpectedSigner(Address),
    /// The address already has a signature attached
    #[error("{0} has already signed this transaction")]
    DuplicateSignature(Address),
    /// The signature does not recover to the claimed address
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// Known system contract types. The list mirrors the node's `ContractType` enum
/// for the contracts a wallet typically builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum ContractType {
    AccountCreateContract,
    TransferContract,
    TransferAssetContract,
    VoteWitnessContract,
    WitnessCreateContract,
    AssetIssueContract,
    WitnessUpdateContract,
    ParticipateAssetIssueContract,
    AccountUpdateContract,
    FreezeBalanceContract,
    UnfreezeBalanceContract,
    WithdrawBalanceContract,
    UpdateAssetContract,
    ProposalCreateContract,
    ProposalApproveContract,
    ProposalDeleteContract,
    CreateSmartContract,
    TriggerSmartContract,
    UpdateSettingContract,
    UpdateEnergyLimitContract,
    AccountPermissionUpdateContract,
    FreezeBalanceV2Contract,
    UnfreezeBalanceV2Contract,
    WithdrawExpireUnfreezeContract,
    DelegateResourceContract,
    UnDelegateResourceContract,
}

/// The `Any`-wrapped parameter of a contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractParameter {
    /// The contract fields, as returned by the node
    pub value: serde_json::Value,
    /// Protobuf type url, e.g. `type.googleapis.com/protocol.TransferContract`
    pub type_url: String,
}

impl ContractParameter {
    /// The account the contract is executed on behalf of.
    pub fn owner_address(&self) -> Option<Address> {
        self.value.get("owner_address")?.as_str()?.parse().ok()
    }
}

/// A single contract call inside a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    pub parameter: ContractParameter,
    /// Permission used for multi-signature accounts, `0` (owner) when omitted
    #[serde(rename = "Permission_id", default, skip_serializing_if = "Option::is_none")]
    pub permission_id: Option<i32>,
}

/// The signed part of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawData {
    pub contract: Vec<Contract>,
    pub ref_block_bytes: String,
    pub ref_block_hash: String,
    /// Expiration, milliseconds since epoch
    pub expiration: i64,
    /// Creation time, milliseconds since epoch
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_limit: Option<i64>,
    /// Memo, hex encoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// An unsigned transaction as built by a node.
///
/// The transaction is immutable once built. Its identifier is the SHA-256 digest of
/// `raw_data_hex`, which can be recomputed at any time with [`Transaction::digest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The identifier advertised by the node
    #[serde(rename = "txID")]
    pub txid: TxId,
    /// Structured view of the signed bytes
    pub raw_data: RawData,
    /// The protobuf encoded raw data, which is what gets hashed and signed
    #[serde(with = "hex_bytes")]
    pub raw_data_hex: Vec<u8>,
    /// Whether addresses in `raw_data` are base58 (`true`) or hex (`false`)
    #[serde(default)]
    pub visible: bool,
}

impl Transaction {
    /// Recomputes the digest from the raw bytes.
    pub fn digest(&self) -> TxId {
        sha256(&self.raw_data_hex)
    }

    /// Checks that the advertised identifier is reproducible from the raw bytes.
    pub fn verify_digest(&self) -> Result<TxId, TransactionError> {
        let computed = self.digest();
        if computed != self.txid {
            return Err(TransactionError::DigestMismatch { advertised: self.txid, computed })
        }
        Ok(computed)
    }

    /// The owner addresses of the contained contracts, deduplicated and in order.
    /// These are the accounts which must sign unless a multi-signature permission
    /// says otherwise.
    pub fn owners(&self) -> Result<Vec<Address>, TransactionError> {
        if self.raw_data.contract.is_empty() {
            return Err(TransactionError::EmptyContract)
        }
        let mut owners = Vec::with_capacity(self.raw_data.contract.len());
        for contract in &self.raw_data.contract {
            let owner =
                contract.parameter.owner_address().ok_or(TransactionError::MissingOwner)?;
            if !owners.contains(&owner) {
                owners.push(owner);
            }
        }
        Ok(owners)
    }
}

/// A transaction together with the signatures collected for it.
///
/// Signatures can only be attached for addresses in the required-signer set, at most
/// once per address, and only when they recover to that address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    transaction: Transaction,
    required: Vec<Address>,
    signatures: Vec<(Address, Signature)>,
}

impl SignedTransaction {
    /// Starts collecting signatures for `transaction` from the `required` addresses.
    pub fn new(transaction: Transaction, required: Vec<Address>) -> Self {
        Self { transaction, required, signatures: Vec::new() }
    }

    /// Verifies `signature` against the transaction digest and attaches it.
    pub fn attach(&mut self, signer: Address, signature: Signature) -> Result<(), TransactionError> {
        if !self.required.contains(&signer) {
            return Err(TransactionError::UnexpectedSigner(signer))
        }
        if self.signatures.iter().any(|(addr, _)| addr == &signer) {
            return Err(TransactionError::DuplicateSignature(signer))
        }
        signature.verify(&self.transaction.digest(), &signer)?;
        self.signatures.push((signer, signature));
        Ok(())
    }

    /// `true` once every required address has signed.
    pub fn is_complete(&self) -> bool {
        self.required.iter().all(|addr| self.signatures.iter().any(|(signer, _)| signer == addr))
    }

    /// Required addresses which have not signed yet.
    pub fn missing(&self) -> Vec<Address> {
        self.required
            .iter()
            .filter(|addr| !self.signatures.iter().any(|(signer, _)| signer == *addr))
            .copied()
            .collect()
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn required_signers(&self) -> &[Address] {
        &self.required
    }

    pub fn signatures(&self) -> impl Iterator<Item = &Signature> {
        self.signatures.iter().map(|(_, sig)| sig)
    }

    pub fn txid(&self) -> TxId {
        self.transaction.txid
    }
}

impl Serialize for SignedTransaction {
    /// Serializes to the node's wire format: the transaction plus a `signature` list.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            #[serde(flatten)]
            transaction: &'a Transaction,
            signature: Vec<&'a Signature>,
        }

        Wire { transaction: &self.transaction, signature: self.signatures().collect() }
            .serialize(serializer)
    }
}
