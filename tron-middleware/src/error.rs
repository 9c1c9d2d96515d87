use crate::ControllerState;
use std::time::Duration;
use thiserror::Error;
use tron_core::types::{Address, ResponseCode, TransactionError, TxId};
use tron_providers::GatewayError;
use tron_signers::SignerError;

/// The categories of execution failures. An on-chain execution failure is not one of
/// them: it is a resolved transaction with a failing result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid input, nothing was sent
    Construction,
    /// No complete set of valid signatures could be collected
    Signing,
    /// The node declined the signed transaction
    BroadcastRejected,
    /// The node could not be reached or did not answer the broadcast in time
    Transport,
    /// The transaction was accepted but its receipt did not show up in time. It may
    /// still be included; query it again by id.
    ConfirmationTimeout,
}

#[derive(Error, Debug)]
/// Error thrown while executing a transaction
pub enum ControllerError {
    /// A timeout or interval is not usable
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    /// The transaction is structurally unusable, e.g. its id is not its digest
    #[error("invalid transaction: {0}")]
    InvalidTransaction(#[source] TransactionError),
    /// Nobody would sign the transaction
    #[error("transaction has no required signers")]
    NoRequiredSigners,
    /// `execute` was called again after the execution failed
    #[error("transaction execution already ended in state {0}")]
    AlreadyExecuted(ControllerState),
    /// The signer could not produce a signature for `address`
    #[error("signing for {address} failed: {source}")]
    Signing {
        address: Address,
        #[source]
        source: SignerError,
    },
    /// The signer returned a signature which does not belong to `address`
    #[error("signature for {address} rejected: {source}")]
    SignatureMismatch {
        address: Address,
        #[source]
        source: TransactionError,
    },
    /// The node declined the broadcast, with its message verbatim
    #[error("broadcast rejected with {code}: {message}")]
    BroadcastRejected { code: ResponseCode, message: String },
    /// The node did not answer the broadcast in time
    #[error("broadcast did not complete within {0:?}")]
    BroadcastTimeout(Duration),
    /// The node could not be reached
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// No terminal receipt within the poll window
    #[error("transaction {txid} not confirmed within {timeout:?}{}", .last_error.as_ref().map(|e| format!(", last error: {e}")).unwrap_or_default())]
    ConfirmationTimeout {
        txid: TxId,
        timeout: Duration,
        /// The most recent failed fetch, if the last attempts failed
        last_error: Option<GatewayError>,
    },
}

impl ControllerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ControllerError::InvalidOptions(_) |
            ControllerError::InvalidTransaction(_) |
            ControllerError::NoRequiredSigners |
            ControllerError::AlreadyExecuted(_) => ErrorKind::Construction,
            ControllerError::Signing { .. } | ControllerError::SignatureMismatch { .. } => {
                ErrorKind::Signing
            }
            ControllerError::BroadcastRejected { .. } => ErrorKind::BroadcastRejected,
            ControllerError::BroadcastTimeout(_) | ControllerError::Gateway(_) => {
                ErrorKind::Transport
            }
            ControllerError::ConfirmationTimeout { .. } => ErrorKind::ConfirmationTimeout,
        }
    }

    /// The last state the execution reached before failing
    pub fn step(&self) -> ControllerState {
        match self.kind() {
            ErrorKind::Construction | ErrorKind::Signing => ControllerState::Built,
            ErrorKind::BroadcastRejected | ErrorKind::Transport => ControllerState::Signed,
            ErrorKind::ConfirmationTimeout => ControllerState::Broadcast,
        }
    }

    /// The signer error, if signing failed
    pub fn as_signer_error(&self) -> Option<&SignerError> {
        match self {
            ControllerError::Signing { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let err = ControllerError::Signing {
            address: Address::from_hash([1; 20]),
            source: SignerError::UserRejected,
        };
        assert_eq!(err.kind(), ErrorKind::Signing);
        assert_eq!(err.step(), ControllerState::Built);
        assert!(matches!(err.as_signer_error(), Some(SignerError::UserRejected)));

        let err = ControllerError::ConfirmationTimeout {
            txid: TxId([1; 32]),
            timeout: Duration::from_secs(60),
            last_error: Some(GatewayError::CustomError("connection reset".to_string())),
        };
        assert_eq!(err.step(), ControllerState::Broadcast);
        assert!(err.to_string().ends_with("last error: connection reset"));
    }
}
