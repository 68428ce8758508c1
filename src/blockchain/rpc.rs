//! Ledger RPC seam.
//!
//! The submitter and the field store only ever talk to the node through
//! [`LedgerRpc`]. `BlockchainClient` implements it over alloy providers; tests
//! implement it in memory.

use alloy::primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;

use crate::blockchain::types::{LedgerResult, Receipt};

/// Node operations consumed by this crate.
///
/// ## Contract
///
/// - Transport failures surface as `LedgerError::RpcUnavailable`.
/// - Implementations MUST NOT retry `send_raw_transaction` internally.
/// - `call` is read-only and side-effect free.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Next nonce for `address`, counting pending transactions.
    async fn transaction_count(&self, address: Address) -> LedgerResult<u64>;

    /// Current network gas price in wei.
    async fn gas_price(&self) -> LedgerResult<u128>;

    /// Gas limit estimate for a call from `from` to `to`.
    async fn estimate_gas(&self, from: Address, to: Address, input: &Bytes) -> LedgerResult<u64>;

    /// Broadcast a signed, EIP-2718 encoded transaction.
    async fn send_raw_transaction(&self, raw: &[u8]) -> LedgerResult<TxHash>;

    /// Receipt for a transaction, `None` while it is not yet mined.
    async fn transaction_receipt(&self, tx_hash: TxHash) -> LedgerResult<Option<Receipt>>;

    /// Latest block number.
    async fn block_number(&self) -> LedgerResult<u64>;

    /// Read-only contract call.
    async fn call(&self, to: Address, input: Bytes) -> LedgerResult<Bytes>;
}
