//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Field write (chunk-encoded call data)
//!     → transaction.rs (build intent: nonce, gas price, gas limit)
//!     → wallet.rs (sign with the caller's key, then drop it)
//!     → rpc.rs / client.rs (broadcast, poll for receipt)
//!
//! Field read
//!     → rpc.rs / client.rs (eth_call)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables (CLI) or per-call arguments
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod rpc;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use rpc::LedgerRpc;
pub use transaction::{Submitter, TransactionIntent};
pub use types::{
    ChainId, LedgerError, LedgerResult, Receipt, SubmissionReceipt, SubmissionState,
    TransactionStatus,
};
pub use wallet::{LocalSigner, TransactionSigner, Wallet};
