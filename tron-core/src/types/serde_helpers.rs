//! Some convenient serde helpers

use serde::{de, Deserialize, Deserializer, Serializer};

/// (De)serializes a byte vector as a hex string without `0x` prefix.
pub mod hex_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let value = String::deserialize(d)?;
        let value = value.strip_prefix("0x").unwrap_or(&value);
        hex::decode(value).map_err(|e| de::Error::custom(format!("invalid hex: {e}")))
    }
}

/// Node messages are hex encoded UTF-8 most of the time, but not always. Decode when
/// possible and keep the original text otherwise.
pub fn deserialize_node_message<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
    Ok(decode_node_message(&raw))
}

pub fn decode_node_message(raw: &str) -> String {
    hex::decode(raw)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| raw.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_hex_messages_only() {
        assert_eq!(decode_node_message("76616c6964617465206661696c6564"), "validate failed");
        assert_eq!(decode_node_message("plain text"), "plain text");
        assert_eq!(decode_node_message(""), "");
    }
}
