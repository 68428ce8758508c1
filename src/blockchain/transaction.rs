//! Transaction building, signing, broadcasting and confirmation.
//!
//! # Responsibilities
//! - Build a fresh intent per attempt (nonce, gas price, gas limit)
//! - Sign and broadcast it
//! - Hand rejected broadcasts to the retry policy
//! - Wait for the receipt within a bounded time
//!
//! # State Machine
//! ```text
//! BUILDING → SIGNED → BROADCAST → CONFIRMED
//!                         │
//!                         └─ rejected → FAILED ─┬─ policy retries → BUILDING (new nonce)
//!                                               └─ policy declines / cap hit → ABORTED
//! ```
//!
//! # Concurrency
//! Writes from one sender are serialized: the sender's lock is held from
//! BUILDING until the node accepts a broadcast, then released before the
//! confirmation wait.

use alloy::primitives::{Address, Bytes, TxHash};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::{interval, timeout};
use uuid::Uuid;

use crate::blockchain::rpc::LedgerRpc;
use crate::blockchain::types::{
    BlockchainConfig, LedgerError, LedgerResult, Receipt, SubmissionConfig, SubmissionReceipt,
    SubmissionState, TransactionStatus,
};
use crate::blockchain::wallet::TransactionSigner;
use crate::observability::metrics;
use crate::resilience::{BroadcastFailure, RetryPolicy};

/// One attempt at a state-changing call.
///
/// Consumed by exactly one sign/broadcast; a retry builds a new intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
    /// Correlates logs and metrics for this attempt.
    pub id: Uuid,
    /// 1-based attempt number within one `submit` call.
    pub attempt: u32,
    pub sender: Address,
    pub to: Address,
    /// ABI-encoded call data with chunk arguments.
    pub input: Bytes,
    pub nonce: u64,
    /// Gas price in wei, after the configured multiplier.
    pub gas_price: u128,
    pub gas_limit: u64,
    pub chain_id: u64,
}

/// Drives writes through the submission state machine.
pub struct Submitter {
    rpc: Arc<dyn LedgerRpc>,
    signer: Arc<dyn TransactionSigner>,
    retry_policy: Arc<dyn RetryPolicy>,
    chain: BlockchainConfig,
    settings: SubmissionConfig,
    sender_locks: DashMap<Address, Arc<Mutex<()>>>,
}

impl Submitter {
    pub fn new(
        rpc: Arc<dyn LedgerRpc>,
        signer: Arc<dyn TransactionSigner>,
        retry_policy: Arc<dyn RetryPolicy>,
        chain: BlockchainConfig,
        settings: SubmissionConfig,
    ) -> Self {
        Self {
            rpc,
            signer,
            retry_policy,
            chain,
            settings,
            sender_locks: DashMap::new(),
        }
    }

    /// Submit a contract call and wait until it is mined.
    ///
    /// # Arguments
    /// * `sender` - Address the key must derive to
    /// * `private_key` - Hex key, used for signing only and never stored
    /// * `to` - Contract address
    /// * `input` - ABI-encoded call data
    ///
    /// # Errors
    /// `RpcUnavailable` and `Signing` propagate immediately. A rejected
    /// broadcast becomes `TransactionFailed` once the policy declines. A
    /// missing receipt becomes `ConfirmationTimeout`, which is never retried.
    pub async fn submit(
        &self,
        sender: Address,
        private_key: &str,
        to: Address,
        input: Bytes,
    ) -> LedgerResult<SubmissionReceipt> {
        let lock = self.sender_lock(sender);
        let (intent, tx_hash) = {
            let _guard = lock.lock().await;
            self.broadcast_with_retry(sender, private_key, to, &input).await?
        };

        let started = Instant::now();
        let receipt = self.wait_for_confirmation(&intent, tx_hash).await?;
        metrics::record_confirmation_latency(started.elapsed());
        record_transition(&intent, SubmissionState::Confirmed, Some(tx_hash));

        Ok(SubmissionReceipt {
            tx_hash,
            block_number: receipt.block_number.unwrap_or_default(),
            gas_used: receipt.gas_used,
            nonce: intent.nonce,
            attempts: intent.attempt,
        })
    }

    /// One-shot lookup of a transaction, e.g. after `ConfirmationTimeout`.
    pub async fn status(&self, tx_hash: TxHash) -> LedgerResult<TransactionStatus> {
        let status = match self.rpc.transaction_receipt(tx_hash).await? {
            None => TransactionStatus::Pending,
            Some(Receipt { block_number: None, .. }) => TransactionStatus::Pending,
            Some(Receipt {
                block_number: Some(block_number),
                success: false,
                ..
            }) => TransactionStatus::Reverted { block_number },
            Some(Receipt {
                block_number: Some(block_number),
                gas_used,
                ..
            }) => TransactionStatus::Mined {
                block_number,
                gas_used,
            },
        };
        Ok(status)
    }

    async fn broadcast_with_retry(
        &self,
        sender: Address,
        private_key: &str,
        to: Address,
        input: &Bytes,
    ) -> LedgerResult<(TransactionIntent, TxHash)> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let intent = self.build(sender, to, input, attempt).await?;
            let raw = self.signer.sign(&intent, private_key).await?;
            record_transition(&intent, SubmissionState::Signed, None);

            let error = match self.rpc.send_raw_transaction(&raw).await {
                Ok(tx_hash) => {
                    record_transition(&intent, SubmissionState::Broadcast, Some(tx_hash));
                    return Ok((intent, tx_hash));
                }
                Err(e) => e,
            };

            record_transition(&intent, SubmissionState::Failed, None);
            let failure = BroadcastFailure {
                attempt,
                nonce: intent.nonce,
                reason: error.to_string(),
            };

            let capped = self.settings.max_attempts.is_some_and(|max| attempt >= max);
            if capped || !self.retry_policy.should_retry(&failure).await {
                record_transition(&intent, SubmissionState::Aborted, None);
                return Err(LedgerError::TransactionFailed {
                    attempts: attempt,
                    reason: failure.reason,
                });
            }

            tracing::warn!(
                intent_id = %intent.id,
                attempt = attempt,
                reason = %failure.reason,
                "Broadcast rejected, rebuilding with a fresh nonce"
            );
        }
    }

    /// BUILDING: fetch nonce, gas price and gas limit for a new intent.
    async fn build(
        &self,
        sender: Address,
        to: Address,
        input: &Bytes,
        attempt: u32,
    ) -> LedgerResult<TransactionIntent> {
        let id = Uuid::new_v4();
        metrics::record_submission_transition(SubmissionState::Building.as_str());
        tracing::debug!(intent_id = %id, attempt = attempt, sender = %sender, "Building transaction");

        let nonce = self.rpc.transaction_count(sender).await?;
        let gas_price = adjusted_gas_price(
            self.rpc.gas_price().await?,
            self.chain.gas_price_multiplier,
            self.chain.max_gas_price_gwei,
        )?;
        let gas_limit = self.rpc.estimate_gas(sender, to, input).await?;

        Ok(TransactionIntent {
            id,
            attempt,
            sender,
            to,
            input: input.clone(),
            nonce,
            gas_price,
            gas_limit,
            chain_id: self.chain.chain_id,
        })
    }

    /// Poll for the receipt until mined, reverted, or the timeout elapses.
    async fn wait_for_confirmation(
        &self,
        intent: &TransactionIntent,
        tx_hash: TxHash,
    ) -> LedgerResult<Receipt> {
        let required_confirmations = self.settings.confirmation_blocks;
        let timeout_duration = Duration::from_secs(self.settings.confirmation_timeout_secs);
        let poll_interval = Duration::from_millis(self.settings.poll_interval_ms);

        let result = timeout(timeout_duration, async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                // Lookup errors are retried until the confirmation timeout.
                let receipt = match self.rpc.transaction_receipt(tx_hash).await {
                    Ok(Some(r)) => r,
                    Ok(None) => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt lookup failed");
                        continue;
                    }
                };

                if !receipt.success {
                    return Err(LedgerError::Reverted { tx_hash });
                }

                let Some(tx_block) = receipt.block_number else {
                    continue;
                };
                if required_confirmations == 0 {
                    return Ok(receipt);
                }

                let current_block = match self.rpc.block_number().await {
                    Ok(block) => block,
                    Err(e) => {
                        tracing::warn!(tx_hash = %tx_hash, error = %e, "Block number lookup failed");
                        continue;
                    }
                };
                let confirmations = current_block.saturating_sub(tx_block) as u32;
                if confirmations >= required_confirmations {
                    return Ok(receipt);
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = confirmations,
                    required = required_confirmations,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(e)) => {
                record_transition(intent, SubmissionState::Failed, Some(tx_hash));
                Err(e)
            }
            Err(_) => {
                // The transaction may still be mined; callers resolve it with `status`.
                tracing::warn!(
                    intent_id = %intent.id,
                    tx_hash = %tx_hash,
                    timeout_secs = self.settings.confirmation_timeout_secs,
                    "Confirmation timed out; transaction fate unknown"
                );
                metrics::record_confirmation_timeout();
                Err(LedgerError::ConfirmationTimeout {
                    tx_hash,
                    waited_secs: self.settings.confirmation_timeout_secs,
                })
            }
        }
    }

    fn sender_lock(&self, sender: Address) -> Arc<Mutex<()>> {
        self.sender_locks
            .entry(sender)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("chain_id", &self.chain.chain_id)
            .field("confirmation_timeout_secs", &self.settings.confirmation_timeout_secs)
            .field("max_attempts", &self.settings.max_attempts)
            .finish()
    }
}

/// Apply the configured multiplier, rejecting prices above the cap.
fn adjusted_gas_price(gas_price: u128, multiplier: f64, max_gwei: u64) -> LedgerResult<u128> {
    let gas_price_gwei = gas_price / 1_000_000_000;
    if gas_price_gwei > max_gwei as u128 {
        return Err(LedgerError::GasPriceTooHigh {
            current_gwei: gas_price_gwei as u64,
            max_gwei,
        });
    }
    Ok((gas_price as f64 * multiplier) as u128)
}

fn record_transition(intent: &TransactionIntent, state: SubmissionState, tx_hash: Option<TxHash>) {
    metrics::record_submission_transition(state.as_str());

    let tx_hash = tx_hash.map(|h| h.to_string()).unwrap_or_default();
    match state {
        SubmissionState::Building | SubmissionState::Signed => tracing::debug!(
            intent_id = %intent.id,
            attempt = intent.attempt,
            nonce = intent.nonce,
            state = %state,
            "Submission state changed"
        ),
        SubmissionState::Broadcast | SubmissionState::Confirmed => tracing::info!(
            intent_id = %intent.id,
            attempt = intent.attempt,
            nonce = intent.nonce,
            tx_hash = %tx_hash,
            state = %state,
            "Submission state changed"
        ),
        SubmissionState::Failed => tracing::warn!(
            intent_id = %intent.id,
            attempt = intent.attempt,
            nonce = intent.nonce,
            tx_hash = %tx_hash,
            state = %state,
            "Submission state changed"
        ),
        SubmissionState::Aborted => tracing::error!(
            intent_id = %intent.id,
            attempt = intent.attempt,
            state = %state,
            "Submission aborted"
        ),
    }
}
