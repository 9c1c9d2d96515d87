use crate::{ControllerError, ControllerOptions, ExecutionReport, ReceiptResolver};
use std::fmt;
use tokio::time::timeout;
use tron_core::types::{
    Address, BroadcastResult, ExecutionResult, SignedTransaction, Transaction, TransactionError,
    TransactionInfo, TxId,
};
use tron_providers::Gateway;
use tron_signers::{Signer, SignerError};

/// Progress of a transaction execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControllerState {
    /// Unsigned, as received from the node
    Built,
    /// Every required signer has a verified signature attached
    Signed,
    /// The node accepted the signed transaction
    Broadcast,
    /// A terminal receipt was found. The execution itself may still have failed.
    Resolved,
    Failed,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerState::Built => "built",
            ControllerState::Signed => "signed",
            ControllerState::Broadcast => "broadcast",
            ControllerState::Resolved => "resolved",
            ControllerState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Drives one transaction from unsigned to resolved.
///
/// The controller signs the transaction with every required signer, broadcasts it and
/// waits for its receipt. It borrows the gateway and the signer, so both can be shared
/// between executions; the controller itself owns a single attempt.
///
/// # Example
///
/// ```no_run
/// use tron_middleware::{ControllerOptions, TransactionController};
/// use tron_providers::{ContractParameters, Gateway, Http};
/// use tron_signers::Keystore;
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway: Http = "http://localhost:8090".parse()?;
/// let keystore = Keystore::new("./keystore", "passphrase");
///
/// let params = ContractParameters::ProposalApprove {
///     owner: "TJRabPrwbZy45sbavfcjinPJC18kjpRTv8".parse()?,
///     proposal_id: 7,
///     approve: true,
/// };
/// let tx = gateway.build_transaction(&params).await?;
///
/// let mut controller =
///     TransactionController::new(&gateway, &keystore, tx, ControllerOptions::default())?;
/// let result = controller.execute().await?;
/// println!("{}: {}", result.code, result.message);
/// println!("{}", serde_json::to_string_pretty(&controller.report())?);
/// # Ok(())
/// # }
/// ```
pub struct TransactionController<'a, G, S: ?Sized> {
    gateway: &'a G,
    signer: &'a S,
    transaction: Transaction,
    digest: TxId,
    required: Vec<Address>,
    options: ControllerOptions,
    state: ControllerState,
    signed: Option<SignedTransaction>,
    broadcast: Option<BroadcastResult>,
    receipt: Option<TransactionInfo>,
    result: Option<ExecutionResult>,
}

impl<'a, G, S> TransactionController<'a, G, S>
where
    G: Gateway,
    S: Signer + ?Sized,
{
    /// Prepares an execution. No I/O happens until [`execute`](Self::execute).
    ///
    /// The required signers are the owners of the transaction's contracts, use
    /// [`with_signers`](Self::with_signers) for multi-signature accounts.
    pub fn new(
        gateway: &'a G,
        signer: &'a S,
        transaction: Transaction,
        options: ControllerOptions,
    ) -> Result<Self, ControllerError> {
        options.validate()?;
        let digest = transaction.verify_digest().map_err(ControllerError::InvalidTransaction)?;
        let required = match transaction.owners() {
            Ok(owners) => owners,
            Err(TransactionError::EmptyContract) => return Err(ControllerError::NoRequiredSigners),
            Err(err) => return Err(ControllerError::InvalidTransaction(err)),
        };

        Ok(Self {
            gateway,
            signer,
            transaction,
            digest,
            required,
            options,
            state: ControllerState::Built,
            signed: None,
            broadcast: None,
            receipt: None,
            result: None,
        })
    }

    /// Replaces the required signers. Duplicates are ignored.
    pub fn with_signers(
        mut self,
        signers: impl IntoIterator<Item = Address>,
    ) -> Result<Self, ControllerError> {
        let mut required = Vec::new();
        for signer in signers {
            if !required.contains(&signer) {
                required.push(signer);
            }
        }
        if required.is_empty() {
            return Err(ControllerError::NoRequiredSigners)
        }
        self.required = required;
        Ok(self)
    }

    /// Signs, broadcasts and resolves the transaction.
    ///
    /// Returns the execution result once a terminal receipt is found, which may be a
    /// failed execution. Calling it again after it resolved returns the same result.
    #[tracing::instrument(name = "execute", skip(self), fields(txid = %self.digest))]
    pub async fn execute(&mut self) -> Result<ExecutionResult, ControllerError> {
        if let (ControllerState::Resolved, Some(result)) = (self.state, &self.result) {
            return Ok(result.clone())
        }
        if self.state != ControllerState::Built {
            return Err(ControllerError::AlreadyExecuted(self.state))
        }

        match self.run().await {
            Ok(result) => Ok(result),
            Err(err) => {
                tracing::warn!(%err, step = %err.step(), "transaction execution failed");
                self.state = ControllerState::Failed;
                Err(err)
            }
        }
    }

    async fn run(&mut self) -> Result<ExecutionResult, ControllerError> {
        self.sign().await?;
        self.state = ControllerState::Signed;
        tracing::debug!(signers = self.required.len(), "transaction signed");

        self.submit().await?;
        self.state = ControllerState::Broadcast;
        tracing::debug!("broadcast accepted");

        let receipt = ReceiptResolver::new(self.gateway, &self.options).resolve(&self.digest).await?;
        let result = receipt.execution_result();
        tracing::debug!(success = result.success, code = %result.code, "transaction resolved");
        self.receipt = Some(receipt);
        self.result = Some(result.clone());
        self.state = ControllerState::Resolved;
        Ok(result)
    }

    // Collects one verified signature per required signer. Signatures collected so far
    // stay readable when a later signer fails.
    async fn sign(&mut self) -> Result<(), ControllerError> {
        let signed = self
            .signed
            .insert(SignedTransaction::new(self.transaction.clone(), self.required.clone()));

        for address in &self.required {
            tracing::debug!(%address, "requesting signature");
            let signature = match timeout(
                self.options.sign_timeout,
                self.signer.sign_transaction(&self.transaction, address),
            )
            .await
            {
                Ok(Ok(signature)) => signature,
                Ok(Err(source)) => {
                    return Err(ControllerError::Signing { address: *address, source })
                }
                Err(_) => {
                    return Err(ControllerError::Signing {
                        address: *address,
                        source: SignerError::DeviceTimeout(self.options.sign_timeout),
                    })
                }
            };

            signed
                .attach(*address, signature)
                .map_err(|source| ControllerError::SignatureMismatch { address: *address, source })?;
        }

        debug_assert!(signed.is_complete());
        Ok(())
    }

    async fn submit(&mut self) -> Result<(), ControllerError> {
        let signed = match &self.signed {
            Some(signed) if signed.is_complete() => signed,
            _ => return Err(ControllerError::NoRequiredSigners),
        };

        let ack = timeout(self.options.broadcast_timeout, self.gateway.broadcast(signed))
            .await
            .map_err(|_| ControllerError::BroadcastTimeout(self.options.broadcast_timeout))??;
        let accepted = ack.is_accepted();
        let (code, message) = (ack.code, ack.message.clone());
        self.broadcast = Some(ack);

        if !accepted {
            return Err(ControllerError::BroadcastRejected { code, message })
        }
        Ok(())
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// The transaction digest, which is also its id
    pub fn txid(&self) -> TxId {
        self.digest
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn required_signers(&self) -> &[Address] {
        &self.required
    }

    /// The transaction with the signatures collected so far
    pub fn signed_transaction(&self) -> Option<&SignedTransaction> {
        self.signed.as_ref()
    }

    /// The node's answer to the broadcast, also kept when it was a rejection
    pub fn broadcast_result(&self) -> Option<&BroadcastResult> {
        self.broadcast.as_ref()
    }

    pub fn receipt(&self) -> Option<&TransactionInfo> {
        self.receipt.as_ref()
    }

    pub fn result(&self) -> Option<&ExecutionResult> {
        self.result.as_ref()
    }

    /// Display summary, once resolved
    pub fn report(&self) -> Option<ExecutionReport> {
        let receipt = self.receipt.as_ref()?;
        let from = self.required.first()?;
        Some(ExecutionReport::new(from, receipt))
    }
}

impl<G: fmt::Debug, S: fmt::Debug + ?Sized> fmt::Debug for TransactionController<'_, G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionController")
            .field("gateway", &self.gateway)
            .field("signer", &self.signer)
            .field("txid", &self.digest)
            .field("required", &self.required)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
