//! Typed reads and writes of ledger fields.
//!
//! # Write path
//! ```text
//! elements → scheme.to_wire → codec::encode (per element)
//!          → setter call data → Submitter::submit
//! ```
//!
//! # Read path
//! ```text
//! getter call data → eth_call → ABI decode → from_words
//!          → codec::decode (per element) → scheme.from_wire
//! ```

use alloy::json_abi::Function;
use alloy::primitives::{Address, TxHash};
use std::collections::HashMap;
use std::sync::Arc;

use crate::blockchain::rpc::LedgerRpc;
use crate::blockchain::transaction::Submitter;
use crate::blockchain::types::{LedgerError, LedgerResult, SubmissionReceipt, TransactionStatus};
use crate::codec::{self, word::from_words};
use crate::fields::catalog::FieldKind;
use crate::fields::contract::{encode_input, parse_function, ContractBinding, ACTIVATE_SIGNATURE};
use crate::fields::record::{FieldRecord, RecordKey};
use crate::observability::metrics;

/// Reads and writes every field of one deployed contract.
pub struct FieldStore {
    rpc: Arc<dyn LedgerRpc>,
    submitter: Arc<Submitter>,
    contract: Address,
    bindings: HashMap<FieldKind, ContractBinding>,
    activate: Function,
}

impl FieldStore {
    /// Resolve every field's contract binding up front.
    pub fn new(rpc: Arc<dyn LedgerRpc>, submitter: Arc<Submitter>, contract: Address) -> LedgerResult<Self> {
        let bindings = FieldKind::ALL
            .into_iter()
            .map(|kind| -> LedgerResult<(FieldKind, ContractBinding)> {
                Ok((kind, ContractBinding::resolve(kind.spec())?))
            })
            .collect::<LedgerResult<HashMap<_, _>>>()?;

        Ok(Self {
            rpc,
            submitter,
            contract,
            bindings,
            activate: parse_function(ACTIVATE_SIGNATURE)?,
        })
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Encode `elements` and submit them as one record.
    ///
    /// Nothing is sent if any element fails to encode.
    pub async fn write(
        &self,
        field: FieldKind,
        key: &RecordKey,
        sender: Address,
        private_key: &str,
        elements: &[Vec<u8>],
    ) -> LedgerResult<SubmissionReceipt> {
        let result = self.try_write(field, key, sender, private_key, elements).await;
        metrics::record_field_operation(field.name(), "write", result.is_ok());
        result
    }

    /// Write a single text element.
    pub async fn write_text(
        &self,
        field: FieldKind,
        key: &RecordKey,
        sender: Address,
        private_key: &str,
        text: &str,
    ) -> LedgerResult<SubmissionReceipt> {
        self.write(field, key, sender, private_key, &[text.as_bytes().to_vec()])
            .await
    }

    /// Fetch and decode a record. An unwritten record decodes to empty
    /// elements.
    pub async fn read(&self, field: FieldKind, key: &RecordKey) -> LedgerResult<FieldRecord> {
        let result = self.try_read(field, key).await;
        metrics::record_field_operation(field.name(), "read", result.is_ok());
        result
    }

    /// Submit `updateMajorityCount()`.
    pub async fn activate(&self, sender: Address, private_key: &str) -> LedgerResult<SubmissionReceipt> {
        let input = encode_input(&self.activate, &[])?;
        tracing::info!(sender = %sender, contract = %self.contract, "Activating contract");
        self.submitter.submit(sender, private_key, self.contract, input).await
    }

    /// Look up a previously submitted transaction.
    pub async fn status(&self, tx_hash: TxHash) -> LedgerResult<TransactionStatus> {
        self.submitter.status(tx_hash).await
    }

    async fn try_write(
        &self,
        field: FieldKind,
        key: &RecordKey,
        sender: Address,
        private_key: &str,
        elements: &[Vec<u8>],
    ) -> LedgerResult<SubmissionReceipt> {
        let binding = self.binding(field)?;
        let spec = binding.spec();

        if elements.len() != spec.elements {
            return Err(LedgerError::Contract(format!(
                "{} takes {} element(s), got {}",
                field,
                spec.elements,
                elements.len()
            )));
        }
        let process_id = key.for_write(field, spec.key, sender)?;

        let layout = spec.layout();
        let padding = spec.padding();
        let mut slots = Vec::with_capacity(spec.word_count());
        for element in elements {
            let wire = spec.scheme.to_wire(element)?;
            slots.extend(codec::encode(&wire, layout, &padding)?);
        }

        let input = binding.encode_write(process_id, &slots)?;
        tracing::debug!(
            field = %field,
            process_id = ?process_id,
            sender = %sender,
            "Writing record"
        );

        self.submitter.submit(sender, private_key, self.contract, input).await
    }

    async fn try_read(&self, field: FieldKind, key: &RecordKey) -> LedgerResult<FieldRecord> {
        let binding = self.binding(field)?;
        let spec = binding.spec();
        let (owner, process_id) = key.for_read(field, spec.key)?;

        let input = binding.encode_read(owner, process_id)?;
        let output = self.rpc.call(self.contract, input).await?;
        let raw = binding.decode_read(&output)?;

        let layout = spec.layout();
        let padding = spec.padding();
        let elements = raw
            .words
            .chunks(spec.slots_per_element)
            .map(|words| -> LedgerResult<Vec<u8>> {
                let wire = codec::decode(&from_words(words), layout, &padding)?;
                Ok(spec.scheme.from_wire(wire)?)
            })
            .collect::<LedgerResult<Vec<_>>>()?;

        tracing::debug!(field = %field, process_id = ?process_id, "Read record");

        Ok(FieldRecord {
            field,
            elements,
            status: raw.status,
            sender: raw.sender,
        })
    }

    fn binding(&self, field: FieldKind) -> LedgerResult<&ContractBinding> {
        self.bindings
            .get(&field)
            .ok_or_else(|| LedgerError::Contract(format!("no binding for {}", field)))
    }
}

impl std::fmt::Debug for FieldStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldStore")
            .field("contract", &self.contract)
            .field("fields", &self.bindings.len())
            .finish()
    }
}
