// Code adapted from: https://github.com/tomusdrw/rust-web3/blob/master/src/api/accounts.rs
use crate::{
    types::{Address, TxId},
    utils::public_key_to_address,
};
use k256::ecdsa::{
    Error as K256SignatureError, RecoveryId, Signature as K256Signature, VerifyingKey,
};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{convert::TryFrom, fmt, str::FromStr};
use thiserror::Error;

/// An error involving a signature.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Invalid length, secp256k1 signatures are 65 bytes
    #[error("invalid signature length, got {0}, expected 65")]
    InvalidLength(usize),
    /// When parsing a signature from string to hex
    #[error(transparent)]
    DecodingError(#[from] hex::FromHexError),
    /// Thrown when signature verification failed (i.e. when the address that
    /// produced the signature did not match the expected address)
    #[error("Signature verification failed. Expected {0}, got {1}")]
    VerificationError(Address, Address),
    /// Internal error during signature recovery
    #[error(transparent)]
    K256Error(#[from] K256SignatureError),
    /// Error in recovering public key from signature
    #[error("Public key recovery error")]
    RecoveryError,
}

/// A recoverable ECDSA signature over a transaction digest.
///
/// Serialized as 65 bytes `r || s || v` where `v` is the recovery id. Both the raw
/// (`0`/`1`) and the 'Electrum' (`27`/`28`) notation are accepted when parsing.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    /// R value
    pub r: [u8; 32],
    /// S Value
    pub s: [u8; 32],
    /// V value
    pub v: u8,
}

impl Signature {
    /// Verifies that signature on `digest` was produced by `address`
    pub fn verify(&self, digest: &TxId, address: &Address) -> Result<(), SignatureError> {
        let recovered = self.recover(digest)?;
        if &recovered != address {
            return Err(SignatureError::VerificationError(*address, recovered))
        }

        Ok(())
    }

    /// Recovers the address which was used to sign the given digest.
    pub fn recover(&self, digest: &TxId) -> Result<Address, SignatureError> {
        let (recoverable_sig, recovery_id) = self.as_signature()?;
        let verify_key =
            VerifyingKey::recover_from_prehash(digest.as_ref(), &recoverable_sig, recovery_id)?;

        Ok(public_key_to_address(&verify_key))
    }

    /// Retrieves the recovery signature.
    fn as_signature(&self) -> Result<(K256Signature, RecoveryId), SignatureError> {
        let recovery_id = self.recovery_id()?;
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..].copy_from_slice(&self.s);
        let signature = K256Signature::from_slice(&bytes)?;

        Ok((signature, recovery_id))
    }

    /// Retrieve the recovery ID.
    pub fn recovery_id(&self) -> Result<RecoveryId, SignatureError> {
        let standard_v = match self.v {
            0 | 27 => 0,
            1 | 28 => 1,
            _ => return Err(SignatureError::RecoveryError),
        };
        RecoveryId::from_byte(standard_v).ok_or(SignatureError::RecoveryError)
    }

    /// Copies and serializes `self` into a new `Vec` with the recovery id included
    #[allow(clippy::wrong_self_convention)]
    pub fn to_vec(&self) -> Vec<u8> {
        <[u8; 65]>::from(self).to_vec()
    }
}

impl From<(K256Signature, RecoveryId)> for Signature {
    fn from((signature, recovery_id): (K256Signature, RecoveryId)) -> Self {
        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Signature { r, s, v: recovery_id.to_byte() }
    }
}

impl<'a> TryFrom<&'a [u8]> for Signature {
    type Error = SignatureError;

    /// Parses a raw signature which is expected to be 65 bytes long where
    /// the first 32 bytes is the `r` value, the second 32 bytes the `s` value
    /// and the final byte is the `v` value.
    fn try_from(bytes: &'a [u8]) -> Result<Self, Self::Error> {
        if bytes.len() != 65 {
            return Err(SignatureError::InvalidLength(bytes.len()))
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[0..32]);
        s.copy_from_slice(&bytes[32..64]);

        Ok(Signature { r, s, v: bytes[64] })
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        Signature::try_from(&bytes[..])
    }
}

impl From<&Signature> for [u8; 65] {
    fn from(src: &Signature) -> [u8; 65] {
        let mut sig = [0u8; 65];
        sig[..32].copy_from_slice(&src.r);
        sig[32..64].copy_from_slice(&src.s);
        sig[64] = src.v;
        sig
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sig = <[u8; 65]>::from(self);
        write!(f, "{}", hex::encode(&sig[..]))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{secret_key_to_address, sha256};
    use k256::ecdsa::SigningKey;

    fn sign(key: &SigningKey, digest: &TxId) -> Signature {
        key.sign_prehash_recoverable(digest.as_ref()).unwrap().into()
    }

    #[test]
    fn recovers_signer() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let digest = sha256(b"some raw data");
        let signature = sign(&key, &digest);

        assert_eq!(signature.recover(&digest).unwrap(), secret_key_to_address(&key));
        signature.verify(&digest, &secret_key_to_address(&key)).unwrap();
    }

    #[test]
    fn verify_rejects_other_address() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let other = SigningKey::random(&mut rand::thread_rng());
        let digest = sha256(b"some raw data");
        let signature = sign(&key, &digest);

        let err = signature.verify(&digest, &secret_key_to_address(&other)).unwrap_err();
        assert!(matches!(err, SignatureError::VerificationError(..)));
    }

    #[test]
    fn electrum_v_is_accepted() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let digest = sha256(b"electrum");
        let mut signature = sign(&key, &digest);
        signature.v += 27;
        assert_eq!(signature.recover(&digest).unwrap(), secret_key_to_address(&key));

        signature.v = 5;
        assert!(matches!(signature.recover(&digest), Err(SignatureError::RecoveryError)));
    }

    #[test]
    fn signature_from_str() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let signature = sign(&key, &sha256(b"hex"));
        let s = signature.to_string();

        assert_eq!(Signature::from_str(&s).unwrap(), signature);
        assert_eq!(Signature::from_str(&format!("0x{s}")).unwrap(), signature);
        assert!(matches!(
            Signature::from_str(&s[..128]),
            Err(SignatureError::InvalidLength(64))
        ));
    }
}
