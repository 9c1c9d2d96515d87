#![allow(clippy::upper_case_acronyms)]
//! Helpers for interacting with the Tron Ledger App
use std::fmt;
use thiserror::Error;
use tron_core::types::{AddressError, SignatureError};

/// BIP-44 coin type registered for Tron
pub const COIN_TYPE: u32 = 195;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Ledger wallet type
pub enum DerivationType {
    /// Ledger Live-generated HD path, `m/44'/195'/{index}'/0/0`
    LedgerLive(usize),
    /// Any other path
    Other(String),
}

impl fmt::Display for DerivationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DerivationType::LedgerLive(index) => write!(f, "m/44'/{COIN_TYPE}'/{index}'/0/0"),
            DerivationType::Other(inner) => f.write_str(inner),
        }
    }
}

#[derive(Error, Debug)]
/// Error when using the Ledger transport
pub enum LedgerError {
    /// The transport to the device failed, e.g. it was unplugged
    #[error("device transport error: {0}")]
    Transport(String),
    /// The device answered with a non-success status word
    #[error("device returned status 0x{0:04x}")]
    Status(u16),
    /// Device response was unexpectedly none
    #[error("Received unexpected response from device. Expected data in response, found none.")]
    UnexpectedNullResponse,
    /// Got a response, but it didn't contain as much data as expected
    #[error("Cannot deserialize ledger response, insufficient bytes. Got {got} expected at least {at_least}")]
    ShortResponse { got: usize, at_least: usize },
    /// Payload is empty
    #[error("Payload must not be empty")]
    EmptyPayload,
    /// The derivation path could not be parsed
    #[error("invalid derivation path: {0}")]
    InvalidDerivation(String),
    /// The device returned an address which could not be parsed
    #[error(transparent)]
    Address(#[from] AddressError),
    /// The device returned a malformed signature
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl LedgerError {
    /// The user declined the request on the device.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, LedgerError::Status(sw) if *sw == SW_DENIED)
    }

    /// The device is unreachable, locked, or the Tron app is not open.
    pub fn is_disconnected(&self) -> bool {
        match self {
            LedgerError::Transport(_) => true,
            LedgerError::Status(sw) => SW_APP_NOT_OPEN.contains(sw),
            _ => false,
        }
    }
}

pub const CLA: u8 = 0xe0;

/// Address queries never ask for on-device confirmation
pub const P1_NON_CONFIRM: u8 = 0x00;

/// Largest chunk of payload sent in a single exchange
pub const CHUNK_SIZE: usize = 250;

/// Status word of a successful exchange
pub const SW_OK: u16 = 0x9000;
/// Conditions of use not satisfied: the user rejected the request
pub const SW_DENIED: u16 = 0x6985;
/// Status words returned when the device is locked or another app is open
pub const SW_APP_NOT_OPEN: [u16; 4] = [0x6d00, 0x6e00, 0x6e01, 0x6511];

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[allow(non_camel_case_types)]
pub enum INS {
    GET_PUBLIC_KEY = 0x02,
    SIGN = 0x04,
    SIGN_TXN_HASH = 0x05,
    GET_APP_CONFIGURATION = 0x06,
}

impl std::fmt::Display for INS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            INS::GET_PUBLIC_KEY => write!(f, "GET_PUBLIC_KEY"),
            INS::SIGN => write!(f, "SIGN"),
            INS::SIGN_TXN_HASH => write!(f, "SIGN_TXN_HASH"),
            INS::GET_APP_CONFIGURATION => write!(f, "GET_APP_CONFIGURATION"),
        }
    }
}

/// Chunk markers of a multi-part signing request.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[allow(non_camel_case_types)]
pub enum P1 {
    /// first of several chunks
    FIRST = 0x00,
    /// the only chunk
    SINGLE = 0x10,
    /// a middle chunk
    MORE = 0x80,
    /// the final chunk
    LAST = 0x90,
}

impl P1 {
    /// Marker for chunk `index` out of `total`.
    pub fn for_chunk(index: usize, total: usize) -> Self {
        match (index, total) {
            (_, 1) => P1::SINGLE,
            (0, _) => P1::FIRST,
            (i, t) if i + 1 == t => P1::LAST,
            _ => P1::MORE,
        }
    }
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[allow(non_camel_case_types)]
pub enum P2 {
    NO_CHAINCODE = 0x00,
}
