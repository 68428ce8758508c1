//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the ledger client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the ledger client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LedgerConfig {
    /// Node endpoint and deployed contract.
    pub blockchain: BlockchainConfig,

    /// Submission lifecycle and retry behaviour.
    pub submission: SubmissionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Blockchain connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Chain ID (1337 for a local Ganache, 31337 for Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Gas price multiplier (1.0 = node price, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,

    /// Address of the deployed record contract.
    pub contract_address: String,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:7545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1337,
            rpc_timeout_secs: 10,
            gas_price_multiplier: 1.0,
            max_gas_price_gwei: 500,
            contract_address: String::new(),
        }
    }
}

/// Transaction submission configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Maximum time to wait for a receipt, in seconds.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Blocks required on top of the receipt's block (0 = receipt is enough).
    pub confirmation_blocks: u32,

    /// Upper bound on broadcast attempts. `None` leaves retries to the policy.
    pub max_attempts: Option<u32>,

    /// Ask the operator before retrying a failed broadcast.
    pub interactive: bool,

    /// Base delay for automatic retries in milliseconds.
    pub retry_base_delay_ms: u64,

    /// Maximum delay for automatic retries in milliseconds.
    pub retry_max_delay_ms: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_secs: 600,
            poll_interval_ms: 1000,
            confirmation_blocks: 0,
            max_attempts: None,
            interactive: true,
            retry_base_delay_ms: 500,
            retry_max_delay_ms: 10_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
