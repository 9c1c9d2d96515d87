use super::serde_helpers::deserialize_node_message;
use crate::types::TxId;
use serde::{Deserialize, Serialize};

/// Response codes of the node's `BroadcastTransaction` call.
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum ResponseCode {
    #[default]
    SUCCESS,
    SIGERROR,
    CONTRACT_VALIDATE_ERROR,
    CONTRACT_EXE_ERROR,
    BANDWITH_ERROR,
    DUP_TRANSACTION_ERROR,
    TAPOS_ERROR,
    TOO_BIG_TRANSACTION_ERROR,
    TRANSACTION_EXPIRATION_ERROR,
    SERVER_BUSY,
    NO_CONNECTION,
    NOT_ENOUGH_EFFECTIVE_CONNECTION,
    #[serde(other)]
    OTHER_ERROR,
}

/// The node's acknowledgement of a broadcast.
///
/// An accepted broadcast only means the transaction entered the node's pending pool.
/// Whether it executed successfully is only known from its receipt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    #[serde(default)]
    pub result: bool,
    #[serde(default)]
    pub code: ResponseCode,
    /// Decoded node message, empty on success
    #[serde(default, deserialize_with = "deserialize_node_message")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<TxId>,
}

impl BroadcastResult {
    /// `true` only when the node both flagged success and returned the `SUCCESS` code.
    pub fn is_accepted(&self) -> bool {
        self.result && self.code == ResponseCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_acceptance() {
        let ack: BroadcastResult = serde_json::from_str(
            r#"{"result":true,"txid":"77ddfa7093cc5f745c0d3a54abb89ef070f983343c05e0f89e5a52f3e5401299"}"#,
        )
        .unwrap();
        assert!(ack.is_accepted());
        assert!(ack.message.is_empty());
    }

    #[test]
    fn parses_rejection_with_hex_message() {
        let ack: BroadcastResult = serde_json::from_str(
            r#"{"code":"BANDWITH_ERROR","message":"4163636f756e74207265736f7572636520696e73756666696369656e74206572726f722e"}"#,
        )
        .unwrap();
        assert!(!ack.is_accepted());
        assert_eq!(ack.code, ResponseCode::BANDWITH_ERROR);
        assert_eq!(ack.message, "Account resource insufficient error.");
    }

    #[test]
    fn success_flag_and_code_must_agree() {
        let ack = BroadcastResult { result: true, code: ResponseCode::SERVER_BUSY, ..Default::default() };
        assert!(!ack.is_accepted());
        let ack: BroadcastResult = serde_json::from_str(r#"{"result":true,"code":"SOMETHING_NEW"}"#).unwrap();
        assert_eq!(ack.code, ResponseCode::OTHER_ERROR);
        assert!(!ack.is_accepted());
    }
}
