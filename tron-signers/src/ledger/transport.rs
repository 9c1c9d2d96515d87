//! APDU exchange with a signing device.
use super::types::{LedgerError, CLA};
use async_trait::async_trait;
use std::fmt;

/// A command sent to the device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApduCommand {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub data: Vec<u8>,
}

impl ApduCommand {
    pub fn new(ins: u8, p1: u8, p2: u8, data: Vec<u8>) -> Self {
        Self { cla: CLA, ins, p1, p2, data }
    }
}

/// The device's answer: response data and the trailing status word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApduAnswer {
    pub data: Vec<u8>,
    pub retcode: u16,
}

/// A channel to a hardware signing device.
///
/// An exchange may block until the user acts on the device. Implementations are not
/// expected to be used concurrently; the app serializes access.
#[async_trait]
pub trait DeviceTransport: fmt::Debug + Send + Sync {
    async fn exchange(&self, command: &ApduCommand) -> Result<ApduAnswer, LedgerError>;
}

/// USB HID transport backed by `coins-ledger`.
#[cfg(feature = "ledger")]
pub struct HidTransport(coins_ledger::transports::Ledger);

#[cfg(feature = "ledger")]
impl HidTransport {
    /// Opens the first connected device.
    pub async fn connect() -> Result<Self, LedgerError> {
        use coins_ledger::transports::LedgerAsync;

        coins_ledger::transports::Ledger::init()
            .await
            .map(Self)
            .map_err(|e| LedgerError::Transport(e.to_string()))
    }
}

#[cfg(feature = "ledger")]
impl fmt::Debug for HidTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HidTransport").finish()
    }
}

#[cfg(feature = "ledger")]
#[async_trait]
impl DeviceTransport for HidTransport {
    async fn exchange(&self, command: &ApduCommand) -> Result<ApduAnswer, LedgerError> {
        use coins_ledger::{
            common::{APDUCommand, APDUData},
            transports::LedgerAsync,
        };

        let packet = APDUCommand {
            ins: command.ins,
            p1: command.p1,
            p2: command.p2,
            data: APDUData::new(&command.data),
            response_len: None,
        };
        let answer =
            self.0.exchange(&packet).await.map_err(|e| LedgerError::Transport(e.to_string()))?;
        Ok(ApduAnswer {
            data: answer.data().map(<[u8]>::to_vec).unwrap_or_default(),
            retcode: answer.retcode(),
        })
    }
}
