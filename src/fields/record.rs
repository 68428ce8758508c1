//! Record addressing and read results.

use alloy::primitives::Address;
use serde::Serialize;

use crate::blockchain::types::{LedgerError, LedgerResult};
use crate::fields::catalog::{FieldKind, KeyScope};

/// Identifies one record of a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordKey {
    /// Process, message or case id.
    pub process_id: Option<u64>,
    /// Account that wrote the record.
    pub owner: Option<Address>,
}

impl RecordKey {
    pub fn process(process_id: u64) -> Self {
        Self {
            process_id: Some(process_id),
            owner: None,
        }
    }

    pub fn owned(owner: Address, process_id: u64) -> Self {
        Self {
            process_id: Some(process_id),
            owner: Some(owner),
        }
    }

    pub fn owner(owner: Address) -> Self {
        Self {
            process_id: None,
            owner: Some(owner),
        }
    }

    /// Check the key against what a write by `sender` needs.
    ///
    /// The contract keys owner-scoped writes by the transaction sender, so an
    /// explicit owner must equal `sender`.
    pub(crate) fn for_write(&self, field: FieldKind, scope: KeyScope, sender: Address) -> LedgerResult<Option<u64>> {
        if let Some(owner) = self.owner {
            if scope == KeyScope::Process {
                return Err(invalid(field, "field is not keyed by owner"));
            }
            if owner != sender {
                return Err(invalid(field, format!("owner {} differs from sender {}", owner, sender)));
            }
        }
        self.process_for(field, scope)
    }

    /// Check the key against what a read needs; returns `(owner, process_id)`.
    pub(crate) fn for_read(&self, field: FieldKind, scope: KeyScope) -> LedgerResult<(Option<Address>, Option<u64>)> {
        let owner = match (scope, self.owner) {
            (KeyScope::Process, Some(_)) => {
                return Err(invalid(field, "field is not keyed by owner"));
            }
            (KeyScope::Process, None) => None,
            (_, Some(owner)) => Some(owner),
            (_, None) => return Err(invalid(field, "owner address is required")),
        };
        Ok((owner, self.process_for(field, scope)?))
    }

    fn process_for(&self, field: FieldKind, scope: KeyScope) -> LedgerResult<Option<u64>> {
        match (scope, self.process_id) {
            (KeyScope::Owner, Some(_)) => Err(invalid(field, "field takes no process id")),
            (KeyScope::Owner, None) => Ok(None),
            (_, Some(id)) => Ok(Some(id)),
            (_, None) => Err(invalid(field, "process id is required")),
        }
    }
}

fn invalid(field: FieldKind, reason: impl Into<String>) -> LedgerError {
    LedgerError::InvalidRecordKey {
        field: field.name(),
        reason: reason.into(),
    }
}

/// A decoded record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRecord {
    pub field: FieldKind,
    /// One decoded payload per element.
    pub elements: Vec<Vec<u8>>,
    /// Workflow status, for case fields.
    pub status: Option<u8>,
    /// Account that wrote the record, when the contract reports it.
    pub sender: Option<Address>,
}

impl FieldRecord {
    /// First element as text, with trailing whitespace removed.
    pub fn text(&self) -> Option<String> {
        let first = self.elements.first()?;
        std::str::from_utf8(first)
            .ok()
            .map(|s| s.trim_end().to_string())
    }

    /// Every element is empty; the record has never been written.
    pub fn is_unwritten(&self) -> bool {
        self.elements.iter().all(Vec::is_empty)
    }
}
