use crate::{ControllerError, ControllerOptions};
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tron_core::types::{TransactionInfo, TxId};
use tron_providers::{Gateway, GatewayError};

/// Fetches the receipt of a broadcast transaction until it is final.
///
/// The resolver polls at a fixed interval. A receipt only counts once it is terminal
/// (see [`TransactionInfo::is_terminal_for`]); anything else, including failed
/// requests, means "try again". Only the poll deadline ends the loop without a receipt,
/// so the caller is never blocked for longer than the poll timeout plus one request
/// timeout.
///
/// Resolving is read-only: resolving the same id again yields the same receipt.
#[derive(Debug, Clone)]
pub struct ReceiptResolver<'a, G> {
    gateway: &'a G,
    request_timeout: Duration,
    poll_timeout: Duration,
    poll_interval: Duration,
}

impl<'a, G: Gateway> ReceiptResolver<'a, G> {
    pub fn new(gateway: &'a G, options: &ControllerOptions) -> Self {
        Self {
            gateway,
            request_timeout: options.broadcast_timeout,
            poll_timeout: options.poll_timeout,
            poll_interval: options.poll_interval,
        }
    }

    /// Polls for the terminal receipt of `txid`
    #[tracing::instrument(skip(self), fields(timeout = ?self.poll_timeout))]
    pub async fn resolve(&self, txid: &TxId) -> Result<TransactionInfo, ControllerError> {
        let deadline = Instant::now() + self.poll_timeout;
        let mut last_error;
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            match timeout(self.request_timeout, self.gateway.transaction_info(txid)).await {
                Ok(Ok(info)) if info.is_terminal_for(txid) => {
                    tracing::debug!(attempt, block = info.block_number, "receipt resolved");
                    return Ok(info)
                }
                Ok(Ok(info)) => {
                    tracing::trace!(attempt, code = %info.receipt.result, "receipt not final yet");
                    last_error = None;
                }
                Ok(Err(err)) if err.is_not_found() => {
                    tracing::trace!(attempt, "receipt not found yet");
                    last_error = None;
                }
                Ok(Err(err)) => {
                    tracing::warn!(attempt, %err, "fetching receipt failed");
                    last_error = Some(err);
                }
                Err(_) => {
                    tracing::warn!(attempt, timeout = ?self.request_timeout, "receipt request timed out");
                    last_error = Some(GatewayError::CustomError(format!(
                        "request timed out after {:?}",
                        self.request_timeout
                    )));
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(ControllerError::ConfirmationTimeout {
                    txid: *txid,
                    timeout: self.poll_timeout,
                    last_error,
                })
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}
