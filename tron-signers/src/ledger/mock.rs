use super::{
    app::path_to_bytes,
    transport::{ApduAnswer, ApduCommand, DeviceTransport},
    types::*,
};
use async_trait::async_trait;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};
use tron_core::{
    k256::{ecdsa::SigningKey, elliptic_curve::sec1::ToEncodedPoint, PublicKey},
    types::Signature,
    utils::{secret_key_to_address, sha256},
};

/// What the simulated user does when asked to confirm a signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Approval {
    /// Press "approve"
    Approve,
    /// Press "reject"
    Reject,
    /// Walk away from the device
    Stall,
}

#[derive(Clone, Debug, Default)]
/// Simulated Tron app used in test environments. Holds in-memory keys per derivation
/// path and answers APDUs the way the device does.
pub struct MockDevice {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    accounts: Vec<(Vec<u8>, SigningKey)>,
    approvals: VecDeque<Approval>,
    commands: Vec<ApduCommand>,
    buffer: Vec<u8>,
    disconnected: bool,
}

enum Reply {
    Answer(ApduAnswer),
    Stall,
}

const SW_INVALID_DATA: u16 = 0x6a80;
const SW_INS_NOT_SUPPORTED: u16 = 0x6d00;

impl MockDevice {
    /// Instantiates a device with no accounts
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account reachable under `derivation`
    pub fn with_account(self, derivation: DerivationType, key: SigningKey) -> Self {
        let path = path_to_bytes(&derivation).expect("valid derivation path");
        self.state.lock().unwrap().accounts.push((path, key));
        self
    }

    /// Queues the user's answer to the next signing request. Requests approve once the
    /// queue is empty.
    pub fn push_approval(&self, approval: Approval) {
        self.state.lock().unwrap().approvals.push_back(approval);
    }

    /// Simulates unplugging the device
    pub fn disconnect(&self) {
        self.state.lock().unwrap().disconnected = true;
    }

    /// Every command received so far
    pub fn commands(&self) -> Vec<ApduCommand> {
        self.state.lock().unwrap().commands.clone()
    }

    /// Number of completed signing requests (approved or not)
    pub fn sign_requests(&self) -> usize {
        self.commands()
            .iter()
            .filter(|c| {
                (c.ins == INS::SIGN as u8 || c.ins == INS::SIGN_TXN_HASH as u8) &&
                    (c.p1 == P1::SINGLE as u8 || c.p1 == P1::LAST as u8)
            })
            .count()
    }
}

impl MockState {
    fn handle(&mut self, command: &ApduCommand) -> Reply {
        match command.ins {
            ins if ins == INS::GET_PUBLIC_KEY as u8 => self.public_key(&command.data),
            ins if ins == INS::GET_APP_CONFIGURATION as u8 => ok(vec![0x00, 0, 5, 0]),
            ins if ins == INS::SIGN as u8 || ins == INS::SIGN_TXN_HASH as u8 => {
                if command.p1 == P1::FIRST as u8 || command.p1 == P1::SINGLE as u8 {
                    self.buffer.clear();
                }
                self.buffer.extend_from_slice(&command.data);
                if command.p1 == P1::FIRST as u8 || command.p1 == P1::MORE as u8 {
                    return ok(vec![])
                }
                match self.approvals.pop_front().unwrap_or(Approval::Approve) {
                    Approval::Approve => self.sign(ins == INS::SIGN as u8),
                    Approval::Reject => status(SW_DENIED),
                    Approval::Stall => Reply::Stall,
                }
            }
            _ => status(SW_INS_NOT_SUPPORTED),
        }
    }

    fn key_for(&self, path: &[u8]) -> Option<&SigningKey> {
        self.accounts.iter().find(|(p, _)| p == path).map(|(_, key)| key)
    }

    fn public_key(&self, path: &[u8]) -> Reply {
        let Some(key) = self.key_for(path) else { return status(SW_INVALID_DATA) };
        let pubkey = PublicKey::from(key.verifying_key()).to_encoded_point(false);
        let address = secret_key_to_address(key).to_string();

        let mut data = vec![pubkey.as_bytes().len() as u8];
        data.extend_from_slice(pubkey.as_bytes());
        data.push(address.len() as u8);
        data.extend_from_slice(address.as_bytes());
        ok(data)
    }

    fn sign(&mut self, full_transaction: bool) -> Reply {
        let buffer = std::mem::take(&mut self.buffer);
        let Some(depth) = buffer.first() else { return status(SW_INVALID_DATA) };
        let path_len = 1 + 4 * *depth as usize;
        if buffer.len() < path_len {
            return status(SW_INVALID_DATA)
        }
        let (path, rest) = buffer.split_at(path_len);
        let Some(key) = self.key_for(path) else { return status(SW_INVALID_DATA) };

        let digest = if full_transaction {
            sha256(rest)
        } else {
            match <[u8; 32]>::try_from(rest) {
                Ok(digest) => digest.into(),
                Err(_) => return status(SW_INVALID_DATA),
            }
        };
        match key.sign_prehash_recoverable(digest.as_ref()) {
            Ok(signature) => ok(Signature::from(signature).to_vec()),
            Err(_) => status(SW_INVALID_DATA),
        }
    }
}

fn ok(data: Vec<u8>) -> Reply {
    Reply::Answer(ApduAnswer { data, retcode: SW_OK })
}

fn status(retcode: u16) -> Reply {
    Reply::Answer(ApduAnswer { data: vec![], retcode })
}

#[async_trait]
impl DeviceTransport for MockDevice {
    async fn exchange(&self, command: &ApduCommand) -> Result<ApduAnswer, LedgerError> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.commands.push(command.clone());
            if state.disconnected {
                return Err(LedgerError::Transport("device unplugged".into()))
            }
            state.handle(command)
        };

        match reply {
            Reply::Answer(answer) => Ok(answer),
            // the user never answers
            Reply::Stall => Ok(std::future::pending().await),
        }
    }
}
