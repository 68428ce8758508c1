//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Broadcast rejected by the node:
//!     → retries.rs (RetryPolicy: operator prompt / automatic with backoff / never)
//!     → submitter rebuilds the intent with a fresh nonce
//! ```
//!
//! # Design Decisions
//! - Retries are operator-gated by default; blind resubmission is opt-in
//! - Only broadcast rejections are retried
//! - Confirmation timeouts are never retried (the transaction may still land)

pub mod retries;

pub use retries::{policy_from_config, AutoRetry, BroadcastFailure, NeverRetry, OperatorPrompt, RetryPolicy};
