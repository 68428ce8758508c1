//! Key handling and transaction signing.
//!
//! # Security
//! - Private keys are passed per call and parsed into a [`Wallet`] that lives
//!   only for the signing step
//! - Keys are never logged or serialized
//! - The CLI reads keys ONLY from an environment variable

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSigner;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

use crate::blockchain::transaction::TransactionIntent;
use crate::blockchain::types::{LedgerError, LedgerResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "LEDGER_PRIVATE_KEY";

/// Read the hex private key from `LEDGER_PRIVATE_KEY`.
pub fn private_key_from_env() -> LedgerResult<String> {
    std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
        LedgerError::Signing(format!("Environment variable {} not set", PRIVATE_KEY_ENV_VAR))
    })
}

/// Turns a built intent into raw transaction bytes.
///
/// ## Contract
///
/// - Deterministic for identical inputs.
/// - MUST NOT retain `private_key` after returning.
/// - Failures surface as `LedgerError::Signing` and are never retried.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign(&self, intent: &TransactionIntent, private_key: &str) -> LedgerResult<Bytes>;
}

/// Signs with an in-process secp256k1 key.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSigner;

#[async_trait]
impl TransactionSigner for LocalSigner {
    async fn sign(&self, intent: &TransactionIntent, private_key: &str) -> LedgerResult<Bytes> {
        let wallet = Wallet::from_private_key(private_key, intent.chain_id)?;
        if wallet.address() != intent.sender {
            return Err(LedgerError::Signing(format!(
                "Private key belongs to {}, not sender {}",
                wallet.address(),
                intent.sender
            )));
        }
        wallet.sign_intent(intent).await
    }
}

/// A parsed signing key bound to a chain.
#[derive(Debug)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for transaction signing
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> LedgerResult<Self> {
        // Strip 0x prefix if present
        let key_hex = private_key_hex.trim().strip_prefix("0x").unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| LedgerError::Signing(format!("Invalid private key format: {}", e)))?;

        tracing::debug!(address = %signer.address(), chain_id = chain_id, "Wallet loaded");

        Ok(Self { signer, chain_id })
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign an intent as an EIP-155 legacy transaction.
    ///
    /// # Returns
    /// The EIP-2718 encoding, ready for `eth_sendRawTransaction`
    pub async fn sign_intent(&self, intent: &TransactionIntent) -> LedgerResult<Bytes> {
        let mut tx = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: intent.nonce,
            gas_price: intent.gas_price,
            gas_limit: intent.gas_limit,
            to: TxKind::Call(intent.to),
            value: U256::ZERO,
            input: intent.input.clone(),
        };

        let signature = self
            .signer
            .sign_transaction(&mut tx)
            .await
            .map_err(|e| LedgerError::Signing(format!("Signing failed: {}", e)))?;

        let envelope = TxEnvelope::from(tx.into_signed(signature));
        Ok(Bytes::from(envelope.encoded_2718()))
    }
}
