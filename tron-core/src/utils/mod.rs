//! Various utilities for hashing and address derivation.

use crate::types::{Address, TxId};
use k256::{
    ecdsa::{SigningKey, VerifyingKey},
    elliptic_curve::sec1::ToEncodedPoint,
    PublicKey as K256PublicKey,
};
use sha2::{Digest, Sha256};
use tiny_keccak::{Hasher, Keccak};

/// Compute the Keccak-256 hash of input bytes.
pub fn keccak256<T: AsRef<[u8]>>(bytes: T) -> [u8; 32] {
    let mut output = [0u8; 32];

    let mut hasher = Keccak::v256();
    hasher.update(bytes.as_ref());
    hasher.finalize(&mut output);

    output
}

/// Compute the SHA-256 digest of input bytes. Transaction identifiers are the SHA-256
/// of the transaction's raw data.
pub fn sha256<T: AsRef<[u8]>>(bytes: T) -> TxId {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(bytes.as_ref()));
    TxId(out)
}

/// Converts a K256 VerifyingKey to an [`Address`]
pub fn public_key_to_address(pubkey: &VerifyingKey) -> Address {
    let public_key = K256PublicKey::from(pubkey).to_encoded_point(/* compress = */ false);
    let public_key = public_key.as_bytes();
    debug_assert_eq!(public_key[0], 0x04);
    let hash = keccak256(&public_key[1..]);

    let mut account = [0u8; 20];
    account.copy_from_slice(&hash[12..]);
    Address::from_hash(account)
}

/// Converts a K256 SigningKey to an [`Address`]
pub fn secret_key_to_address(secret_key: &SigningKey) -> Address {
    public_key_to_address(secret_key.verifying_key())
}
