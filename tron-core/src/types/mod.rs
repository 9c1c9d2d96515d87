mod address;
pub use address::{Address, AddressError, ADDRESS_PREFIX};

mod txid;
pub use txid::TxId;

mod signature;
pub use signature::{Signature, SignatureError};

mod transaction;
pub use transaction::{
    Contract, ContractParameter, ContractType, RawData, SignedTransaction, Transaction,
    TransactionError,
};

mod broadcast;
pub use broadcast::{BroadcastResult, ResponseCode};

mod receipt;
pub use receipt::{ContractResult, ExecutionResult, InfoCode, ResourceReceipt, TransactionInfo};

pub mod serde_helpers;
