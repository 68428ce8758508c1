//! Chain-specific types and error definitions.

use alloy::primitives::TxHash;
use serde::Serialize;
use thiserror::Error;

use crate::codec::CodecError;

// Re-export BlockchainConfig from config module to avoid duplication
pub use crate::config::schema::{BlockchainConfig, SubmissionConfig};

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

/// Errors that can occur while writing or reading ledger records.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Payload could not be chunked or reassembled.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// RPC transport failed; never retried here.
    #[error("RPC unavailable: {0}")]
    RpcUnavailable(String),

    /// Key parsing or transaction signing failed.
    #[error("Signing error: {0}")]
    Signing(String),

    /// Broadcast was rejected and the retry policy gave up.
    #[error("Transaction failed after {attempts} attempt(s): {reason}")]
    TransactionFailed { attempts: u32, reason: String },

    /// No receipt was observed in time. The transaction may still be mined.
    #[error("Transaction {tx_hash} not confirmed within {waited_secs} seconds")]
    ConfirmationTimeout { tx_hash: TxHash, waited_secs: u64 },

    /// Transaction was mined but reverted.
    #[error("Transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },

    /// Gas price exceeded maximum allowed.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Call data could not be built or return data could not be parsed.
    #[error("Contract ABI error: {0}")]
    Contract(String),

    /// The record key does not match what the field is addressed by.
    #[error("Invalid record key for {field}: {reason}")]
    InvalidRecordKey { field: &'static str, reason: String },
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Receipt as reported by the ledger RPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// False when the transaction reverted.
    pub success: bool,
}

/// Outcome of a confirmed submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    /// Nonce of the attempt that was mined.
    pub nonce: u64,
    /// Number of build/sign/broadcast attempts, including the successful one.
    pub attempts: u32,
}

/// Lifecycle state of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Building,
    Signed,
    Broadcast,
    Confirmed,
    Failed,
    Aborted,
}

impl SubmissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::Building => "building",
            SubmissionState::Signed => "signed",
            SubmissionState::Broadcast => "broadcast",
            SubmissionState::Confirmed => "confirmed",
            SubmissionState::Failed => "failed",
            SubmissionState::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-shot view of a transaction's fate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransactionStatus {
    /// No receipt yet (still in the mempool, or dropped).
    Pending,
    /// Mined successfully.
    Mined { block_number: u64, gas_used: u64 },
    /// Mined and reverted.
    Reverted { block_number: u64 },
}
