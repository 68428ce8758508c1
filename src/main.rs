//! Command-line client for the guarantee ledger.
//!
//! The signing key is read ONLY from `LEDGER_PRIVATE_KEY`; the sender is the
//! address it derives to. Results are printed as JSON on stdout, logs go to
//! stderr.

use std::path::PathBuf;
use std::sync::Arc;

use alloy::hex;
use alloy::primitives::{Address, TxHash};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use guarantee_ledger::blockchain::wallet::{private_key_from_env, Wallet};
use guarantee_ledger::blockchain::{BlockchainClient, LocalSigner, Submitter};
use guarantee_ledger::codec::Scheme;
use guarantee_ledger::config::validation::validate_config;
use guarantee_ledger::config::{load_config, LedgerConfig};
use guarantee_ledger::fields::{FieldKind, FieldRecord, FieldStore, RecordKey};
use guarantee_ledger::observability::{init_logging, metrics};
use guarantee_ledger::resilience::policy_from_config;

#[derive(Parser)]
#[command(name = "guarantee-ledger")]
#[command(about = "Store and fetch loan-guarantee records on chain", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Contract address, overrides the configuration
    #[arg(long)]
    contract: Option<Address>,

    /// Retry rejected broadcasts automatically instead of prompting
    #[arg(long)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode and store a record
    Write {
        field: FieldKind,
        /// Process, message or case id
        #[arg(short, long)]
        id: Option<u64>,
        /// Text element; repeat for multi-element fields
        #[arg(short, long = "text", conflicts_with = "files")]
        texts: Vec<String>,
        /// File whose bytes form one element; repeat for multi-element fields
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,
    },
    /// Fetch and decode a record
    Read {
        field: FieldKind,
        #[arg(short, long)]
        id: Option<u64>,
        /// Account that wrote the record
        #[arg(short, long)]
        owner: Option<Address>,
    },
    /// Call updateMajorityCount()
    Activate,
    /// Look up a transaction after a confirmation timeout
    Status { tx_hash: TxHash },
    /// List the known fields
    Fields,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Fields = cli.command {
        print_json(&list_fields())?;
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LedgerConfig::default(),
    };
    if let Some(contract) = cli.contract {
        config.blockchain.contract_address = contract.to_string();
    }
    if cli.non_interactive {
        config.submission.interactive = false;
    }
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("config error: {}", error);
        }
        return Err("invalid configuration".into());
    }

    init_logging(&config.observability);
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let contract: Address = config.blockchain.contract_address.parse()?;
    let client = Arc::new(BlockchainClient::new(config.blockchain.clone()).await?);
    if !client.is_healthy().await {
        tracing::warn!(rpc_url = %config.blockchain.rpc_url, "RPC node is not answering block queries");
    }
    let submitter = Arc::new(Submitter::new(
        client.clone(),
        Arc::new(LocalSigner),
        policy_from_config(&config.submission),
        config.blockchain.clone(),
        config.submission.clone(),
    ));
    let store = FieldStore::new(client, submitter, contract)?;

    tracing::info!(
        rpc_url = %config.blockchain.rpc_url,
        chain_id = config.blockchain.chain_id,
        contract = %contract,
        "Ledger client ready"
    );

    match cli.command {
        Commands::Write { field, id, texts, files } => {
            let (key, sender) = signing_identity(&config)?;
            let elements = if files.is_empty() {
                texts.into_iter().map(String::into_bytes).collect()
            } else {
                files
                    .iter()
                    .map(std::fs::read)
                    .collect::<Result<Vec<_>, _>>()?
            };
            let record_key = RecordKey {
                process_id: id,
                owner: None,
            };
            let receipt = store.write(field, &record_key, sender, &key, &elements).await?;
            print_json(&serde_json::to_value(receipt)?)?;
        }
        Commands::Read { field, id, owner } => {
            let record = store
                .read(field, &RecordKey { process_id: id, owner })
                .await?;
            print_json(&render_record(&record))?;
        }
        Commands::Activate => {
            let (key, sender) = signing_identity(&config)?;
            let receipt = store.activate(sender, &key).await?;
            print_json(&serde_json::to_value(receipt)?)?;
        }
        Commands::Status { tx_hash } => {
            let status = store.status(tx_hash).await?;
            print_json(&serde_json::to_value(status)?)?;
        }
        Commands::Fields => print_json(&list_fields())?,
    }

    Ok(())
}

/// Key from the environment and the address it derives to.
fn signing_identity(config: &LedgerConfig) -> Result<(String, Address), Box<dyn std::error::Error>> {
    let key = private_key_from_env()?;
    let sender = Wallet::from_private_key(&key, config.blockchain.chain_id)?.address();
    Ok((key, sender))
}

fn render_record(record: &FieldRecord) -> Value {
    let scheme = record.field.spec().scheme;
    let elements: Vec<Value> = record
        .elements
        .iter()
        .map(|element| match (scheme, std::str::from_utf8(element)) {
            (Scheme::Binary, _) | (_, Err(_)) => Value::String(hex::encode_prefixed(element)),
            (_, Ok(text)) => Value::String(text.trim_end().to_string()),
        })
        .collect();

    json!({
        "field": record.field,
        "written": !record.is_unwritten(),
        "status": record.status,
        "sender": record.sender,
        "elements": elements,
    })
}

fn list_fields() -> Value {
    let fields: Vec<Value> = FieldKind::ALL
        .iter()
        .map(|kind| {
            let spec = kind.spec();
            json!({
                "name": kind.name(),
                "setter": spec.setter,
                "getter": spec.getter,
                "key": format!("{:?}", spec.key),
                "elements": spec.elements,
                "slots_per_element": spec.slots_per_element,
                "scheme": spec.scheme,
                "envelope": format!("{:?}", spec.envelope),
            })
        })
        .collect();
    Value::Array(fields)
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
