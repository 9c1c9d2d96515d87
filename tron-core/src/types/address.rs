use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Every mainnet address starts with this byte.
pub const ADDRESS_PREFIX: u8 = 0x41;

const ADDRESS_LEN: usize = 21;

/// An error encountered while parsing an [`Address`].
#[derive(Debug, Error)]
pub enum AddressError {
    /// The decoded payload is not 21 bytes long
    #[error("invalid address length, got {0}, expected 21")]
    InvalidLength(usize),
    /// The first byte is not the network prefix
    #[error("invalid address prefix 0x{0:02x}, expected 0x41")]
    InvalidPrefix(u8),
    /// Hex decoding failed
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),
    /// Base58check decoding failed (bad alphabet or checksum)
    #[error(transparent)]
    Base58(#[from] bs58::decode::Error),
}

/// A 21 byte account address: the `0x41` prefix followed by the last 20 bytes of the
/// keccak-256 hash of the account's public key.
///
/// Displays as base58check (`T...`). On the wire it is carried as a hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Builds an address from the 20 byte account hash, adding the network prefix.
    pub fn from_hash(hash: [u8; 20]) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[0] = ADDRESS_PREFIX;
        bytes[1..].copy_from_slice(&hash);
        Self(bytes)
    }

    /// Parses a 21 byte slice, checking length and prefix.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        if bytes.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength(bytes.len()))
        }
        if bytes[0] != ADDRESS_PREFIX {
            return Err(AddressError::InvalidPrefix(bytes[0]))
        }
        let mut inner = [0u8; ADDRESS_LEN];
        inner.copy_from_slice(bytes);
        Ok(Self(inner))
    }

    /// Parses a base58check string.
    pub fn from_base58(s: &str) -> Result<Self, AddressError> {
        let bytes = bs58::decode(s).with_check(None).into_vec()?;
        Self::from_slice(&bytes)
    }

    /// Parses a hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Self::from_slice(&hex::decode(s)?)
    }

    /// Lowercase hex representation including the network prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).with_check().into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Accepts either the base58check or the hex form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('T') {
            Self::from_base58(s)
        } else {
            Self::from_hex(s)
        }
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
