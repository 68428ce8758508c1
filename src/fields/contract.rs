//! ABI encoding for field setters and getters.
//!
//! Signatures are derived from the [`FieldSpec`] and parsed once per field.

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::Function;
use alloy::primitives::{Address, Bytes, B256, U256};

use crate::blockchain::types::{LedgerError, LedgerResult};
use crate::codec::word::to_word;
use crate::fields::catalog::{Envelope, FieldSpec};

/// Signature of the contract's activation call.
pub const ACTIVATE_SIGNATURE: &str = "function updateMajorityCount()";

/// Getter output before word decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub status: Option<u8>,
    pub sender: Option<Address>,
    pub words: Vec<B256>,
}

/// Resolved setter and getter of one field.
#[derive(Debug, Clone)]
pub struct ContractBinding {
    spec: FieldSpec,
    setter: Function,
    getter: Function,
}

impl ContractBinding {
    pub fn resolve(spec: FieldSpec) -> LedgerResult<Self> {
        Ok(Self {
            spec,
            setter: parse_function(&spec.setter_signature())?,
            getter: parse_function(&spec.getter_signature())?,
        })
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    /// `setter([id,] words...)` call data; `slots` holds every element's
    /// chunks in order.
    pub fn encode_write(&self, process_id: Option<u64>, slots: &[Vec<u8>]) -> LedgerResult<Bytes> {
        if slots.len() != self.spec.word_count() {
            return Err(LedgerError::Contract(format!(
                "{} takes {} words, got {}",
                self.setter.name,
                self.spec.word_count(),
                slots.len()
            )));
        }

        let mut args = Vec::with_capacity(slots.len() + 1);
        if let Some(id) = process_id {
            args.push(DynSolValue::Uint(U256::from(id), 256));
        }
        for slot in slots {
            args.push(DynSolValue::FixedBytes(to_word(slot)?, 32));
        }

        encode_input(&self.setter, &args)
    }

    /// `getter([owner,] [id])` call data.
    pub fn encode_read(&self, owner: Option<Address>, process_id: Option<u64>) -> LedgerResult<Bytes> {
        let mut args = Vec::with_capacity(2);
        if let Some(owner) = owner {
            args.push(DynSolValue::Address(owner));
        }
        if let Some(id) = process_id {
            args.push(DynSolValue::Uint(U256::from(id), 256));
        }
        encode_input(&self.getter, &args)
    }

    pub fn decode_read(&self, output: &[u8]) -> LedgerResult<RawRecord> {
        let values = self
            .getter
            .abi_decode_output(output)
            .map_err(|e| LedgerError::Contract(format!("{} returned bad data: {}", self.getter.name, e)))?;

        let mut values = values.into_iter();
        let (status, sender) = match self.spec.envelope {
            Envelope::Bare => (None, None),
            Envelope::Sender => (None, Some(self.expect_address(values.next())?)),
            Envelope::StatusSender => {
                let status = self.expect_status(values.next())?;
                (Some(status), Some(self.expect_address(values.next())?))
            }
        };

        let words = values
            .map(|value| match value {
                DynSolValue::FixedBytes(word, 32) => Ok(word),
                other => Err(self.unexpected("bytes32", &other)),
            })
            .collect::<LedgerResult<Vec<_>>>()?;

        if words.len() != self.spec.word_count() {
            return Err(LedgerError::Contract(format!(
                "{} returned {} words, expected {}",
                self.getter.name,
                words.len(),
                self.spec.word_count()
            )));
        }

        Ok(RawRecord { status, sender, words })
    }

    fn expect_address(&self, value: Option<DynSolValue>) -> LedgerResult<Address> {
        match value {
            Some(DynSolValue::Address(address)) => Ok(address),
            Some(other) => Err(self.unexpected("address", &other)),
            None => Err(self.missing("address")),
        }
    }

    fn expect_status(&self, value: Option<DynSolValue>) -> LedgerResult<u8> {
        match value {
            Some(DynSolValue::Uint(status, _)) => u8::try_from(status)
                .map_err(|_| LedgerError::Contract(format!("status {} does not fit uint8", status))),
            Some(other) => Err(self.unexpected("uint8", &other)),
            None => Err(self.missing("uint8")),
        }
    }

    fn unexpected(&self, wanted: &str, got: &DynSolValue) -> LedgerError {
        LedgerError::Contract(format!(
            "{} returned {:?} where {} was expected",
            self.getter.name, got, wanted
        ))
    }

    fn missing(&self, wanted: &str) -> LedgerError {
        LedgerError::Contract(format!("{} returned no {}", self.getter.name, wanted))
    }
}

pub fn parse_function(signature: &str) -> LedgerResult<Function> {
    Function::parse(signature)
        .map_err(|e| LedgerError::Contract(format!("bad signature '{}': {}", signature, e)))
}

pub fn encode_input(function: &Function, args: &[DynSolValue]) -> LedgerResult<Bytes> {
    function
        .abi_encode_input(args)
        .map(Bytes::from)
        .map_err(|e| LedgerError::Contract(format!("cannot encode {}: {}", function.name, e)))
}
