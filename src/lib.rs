//! Blockchain-backed record store for the loan-guarantee workflow.
//!
//! ```text
//!   payload elements
//!        │
//!        ▼
//!   ┌──────────┐    ┌────────────┐    ┌──────────────┐    ┌─────────────┐
//!   │  fields  │───▶│   codec    │───▶│  blockchain  │───▶│  JSON-RPC   │
//!   │  façade  │◀───│ chunk/word │◀───│  submitter   │◀───│  node(s)    │
//!   └──────────┘    └────────────┘    └──────┬───────┘    └─────────────┘
//!                                            │
//!                           resilience (retry policy, backoff)
//!                           observability (tracing, metrics)
//!                           config (TOML + validation)
//! ```

pub mod blockchain;
pub mod codec;
pub mod config;
pub mod fields;
pub mod observability;
pub mod resilience;

pub use blockchain::{
    BlockchainClient, LedgerError, LedgerResult, LedgerRpc, LocalSigner, Submitter,
    TransactionSigner,
};
pub use codec::{CodecError, Scheme};
pub use config::LedgerConfig;
pub use fields::{FieldKind, FieldRecord, FieldStore, RecordKey};
