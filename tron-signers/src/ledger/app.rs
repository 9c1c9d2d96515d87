use futures_util::lock::Mutex;
use std::time::Duration;
use tron_core::types::{Address, Signature, Transaction, TxId};

use super::{
    transport::{ApduCommand, DeviceTransport},
    types::*,
};

/// A Ledger Tron App.
///
/// This is a simple wrapper around a [device transport](DeviceTransport). The session
/// is acquired once and may sign any number of transactions, one at a time: the
/// transport sits behind an async mutex so two signing requests never interleave on
/// the device.
#[derive(Debug)]
pub struct LedgerTron<T> {
    transport: Mutex<T>,
    accounts: Vec<(DerivationType, Address)>,
    pub(crate) timeout: Duration,
}

impl<T: DeviceTransport> LedgerTron<T> {
    /// Instantiate the application on an open transport, resolving the address behind
    /// each derivation path. `timeout` bounds every signing round trip, including the
    /// time the user takes to confirm on the device.
    pub async fn new(
        transport: T,
        derivations: Vec<DerivationType>,
        timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let mut accounts = Vec::with_capacity(derivations.len());
        for derivation in derivations {
            let address = Self::get_address_with_path(&transport, &derivation).await?;
            tracing::debug!(%address, path = %derivation, "resolved device account");
            accounts.push((derivation, address));
        }

        Ok(Self { transport: Mutex::new(transport), accounts, timeout })
    }

    /// The addresses this session can sign for.
    pub fn addresses(&self) -> Vec<Address> {
        self.accounts.iter().map(|(_, address)| *address).collect()
    }

    /// The derivation path which controls `address`, if any.
    pub fn derivation_of(&self, address: &Address) -> Option<&DerivationType> {
        self.accounts.iter().find(|(_, addr)| addr == address).map(|(path, _)| path)
    }

    // Gets the account which corresponds to the provided derivation path
    async fn get_address_with_path(
        transport: &T,
        derivation: &DerivationType,
    ) -> Result<Address, LedgerError> {
        let command = ApduCommand::new(
            INS::GET_PUBLIC_KEY as u8,
            P1_NON_CONFIRM,
            P2::NO_CHAINCODE as u8,
            path_to_bytes(derivation)?,
        );
        let result = exchange(transport, &command).await?;

        // [pubkey len][pubkey][address len][base58 address]
        let pubkey_len = *result.first().ok_or(LedgerError::UnexpectedNullResponse)? as usize;
        let offset = 1 + pubkey_len;
        let address_len = *result
            .get(offset)
            .ok_or(LedgerError::ShortResponse { got: result.len(), at_least: offset + 1 })?
            as usize;
        let address_str = result.get(offset + 1..offset + 1 + address_len).ok_or(
            LedgerError::ShortResponse { got: result.len(), at_least: offset + 1 + address_len },
        )?;
        let address_str = String::from_utf8_lossy(address_str);

        Ok(Address::from_base58(&address_str)?)
    }

    /// Returns the semver of the Tron ledger app
    pub async fn version(&self) -> Result<String, LedgerError> {
        let transport = self.transport.lock().await;

        let command = ApduCommand::new(
            INS::GET_APP_CONFIGURATION as u8,
            P1_NON_CONFIRM,
            P2::NO_CHAINCODE as u8,
            vec![],
        );
        let result = exchange(&*transport, &command).await?;
        if result.len() < 4 {
            return Err(LedgerError::ShortResponse { got: result.len(), at_least: 4 })
        }

        Ok(format!("{}.{}.{}", result[1], result[2], result[3]))
    }

    /// Signs a transaction (requires confirmation on the ledger). The full raw data is
    /// sent so the device can display the contract.
    pub async fn sign_tx(
        &self,
        tx: &Transaction,
        derivation: &DerivationType,
    ) -> Result<Signature, LedgerError> {
        let mut payload = path_to_bytes(derivation)?;
        payload.extend_from_slice(&tx.raw_data_hex);
        self.sign_payload(INS::SIGN, payload).await
    }

    /// Signs a bare transaction digest. The device shows the hash only and needs the
    /// corresponding setting enabled.
    pub async fn sign_hash(
        &self,
        digest: &TxId,
        derivation: &DerivationType,
    ) -> Result<Signature, LedgerError> {
        let mut payload = path_to_bytes(derivation)?;
        payload.extend_from_slice(digest.as_ref());
        self.sign_payload(INS::SIGN_TXN_HASH, payload).await
    }

    // Helper function for signing either transaction data or digests
    async fn sign_payload(&self, ins: INS, payload: Vec<u8>) -> Result<Signature, LedgerError> {
        if payload.is_empty() {
            return Err(LedgerError::EmptyPayload)
        }
        let transport = self.transport.lock().await;

        let chunks = payload.chunks(CHUNK_SIZE).collect::<Vec<_>>();
        let mut result = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            let command = ApduCommand::new(
                ins as u8,
                P1::for_chunk(index, chunks.len()) as u8,
                P2::NO_CHAINCODE as u8,
                chunk.to_vec(),
            );
            tracing::trace!(%ins, p1 = command.p1, len = chunk.len(), "sending chunk");
            result = exchange(&*transport, &command).await?;
        }

        if result.len() < 65 {
            return Err(LedgerError::ShortResponse { got: result.len(), at_least: 65 })
        }
        Ok(Signature::try_from(&result[..65])?)
    }
}

async fn exchange<T: DeviceTransport>(
    transport: &T,
    command: &ApduCommand,
) -> Result<Vec<u8>, LedgerError> {
    let answer = transport.exchange(command).await?;
    if answer.retcode != SW_OK {
        return Err(LedgerError::Status(answer.retcode))
    }
    Ok(answer.data)
}

// helper which converts a derivation path to bytes
pub(crate) fn path_to_bytes(derivation: &DerivationType) -> Result<Vec<u8>, LedgerError> {
    let derivation = derivation.to_string();
    let elements = derivation.split('/').skip(1).collect::<Vec<_>>();
    let depth = elements.len();

    let mut bytes = vec![depth as u8];
    for derivation_index in elements {
        let hardened = derivation_index.contains('\'');
        let mut index = derivation_index
            .replace('\'', "")
            .parse::<u32>()
            .map_err(|_| LedgerError::InvalidDerivation(derivation.clone()))?;
        if hardened {
            index |= 0x80000000;
        }

        bytes.extend(&index.to_be_bytes());
    }

    Ok(bytes)
}
