//! The field table.
//!
//! Every logical record the guarantee workflow stores is described by one
//! [`FieldSpec`]. Adding a field means adding a row here, not new code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::codec::{Padding, Scheme, SlotLayout};

/// Marker appended after binary elements.
pub const ELEMENT_PAD_MARKER: &[u8] = b"000000";

/// Logical records stored by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    AuthorityNames,
    HashedElements,
    Elements,
    PublicParameters,
    PublicKey,
    MessageIpfsLink,
    UserAttributes,
    ReaderPublicKey,
    ApplicationForm,
    GuaranteeConfirmation,
    LoanRequest,
    GuaranteeClaim,
    RejectPayment,
    AllowPayment,
    GuaranteeClaimGuarantor,
}

/// What a record is addressed by, besides its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    /// A process, message or case id.
    Process,
    /// The writing account plus a process id.
    OwnerProcess,
    /// The writing account alone.
    Owner,
}

/// Values the getter returns in front of the chunk words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    Bare,
    /// `(address sender, words...)`
    Sender,
    /// `(uint8 status, address sender, words...)`
    StatusSender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub kind: FieldKind,
    pub setter: &'static str,
    pub getter: &'static str,
    pub key: KeyScope,
    /// Independent payloads per record.
    pub elements: usize,
    /// Slots each payload is split across.
    pub slots_per_element: usize,
    pub scheme: Scheme,
    pub pad_marker: Option<&'static [u8]>,
    pub envelope: Envelope,
}

impl FieldSpec {
    const fn text(
        kind: FieldKind,
        setter: &'static str,
        getter: &'static str,
        key: KeyScope,
        envelope: Envelope,
    ) -> Self {
        Self {
            kind,
            setter,
            getter,
            key,
            elements: 1,
            slots_per_element: 2,
            scheme: Scheme::Base64Text,
            pad_marker: None,
            envelope,
        }
    }

    pub fn layout(&self) -> SlotLayout {
        SlotLayout::new(self.slots_per_element)
    }

    pub fn padding(&self) -> Padding {
        match self.pad_marker {
            Some(marker) => Padding::marker(marker),
            None => Padding::None,
        }
    }

    /// Total `bytes32` words in the setter arguments and getter results.
    pub fn word_count(&self) -> usize {
        self.elements * self.slots_per_element
    }

    /// Human-readable setter signature. Owner-keyed setters take no owner;
    /// the contract uses the transaction sender.
    pub fn setter_signature(&self) -> String {
        let mut params = Vec::with_capacity(self.word_count() + 1);
        if self.key != KeyScope::Owner {
            params.push("uint256");
        }
        params.extend(std::iter::repeat("bytes32").take(self.word_count()));
        format!("function {}({})", self.setter, params.join(","))
    }

    pub fn getter_signature(&self) -> String {
        let inputs: &[&str] = match self.key {
            KeyScope::Process => &["uint256"],
            KeyScope::OwnerProcess => &["address", "uint256"],
            KeyScope::Owner => &["address"],
        };
        let mut outputs = match self.envelope {
            Envelope::Bare => Vec::new(),
            Envelope::Sender => vec!["address"],
            Envelope::StatusSender => vec!["uint8", "address"],
        };
        outputs.extend(std::iter::repeat("bytes32").take(self.word_count()));
        format!(
            "function {}({}) external view returns ({})",
            self.getter,
            inputs.join(","),
            outputs.join(",")
        )
    }
}

impl FieldKind {
    pub const ALL: [FieldKind; 15] = [
        FieldKind::AuthorityNames,
        FieldKind::HashedElements,
        FieldKind::Elements,
        FieldKind::PublicParameters,
        FieldKind::PublicKey,
        FieldKind::MessageIpfsLink,
        FieldKind::UserAttributes,
        FieldKind::ReaderPublicKey,
        FieldKind::ApplicationForm,
        FieldKind::GuaranteeConfirmation,
        FieldKind::LoanRequest,
        FieldKind::GuaranteeClaim,
        FieldKind::RejectPayment,
        FieldKind::AllowPayment,
        FieldKind::GuaranteeClaimGuarantor,
    ];

    /// Name used on the command line and in metrics labels.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::AuthorityNames => "authority-names",
            FieldKind::HashedElements => "hashed-elements",
            FieldKind::Elements => "elements",
            FieldKind::PublicParameters => "public-parameters",
            FieldKind::PublicKey => "public-key",
            FieldKind::MessageIpfsLink => "message-ipfs-link",
            FieldKind::UserAttributes => "user-attributes",
            FieldKind::ReaderPublicKey => "reader-public-key",
            FieldKind::ApplicationForm => "application-form",
            FieldKind::GuaranteeConfirmation => "guarantee-confirmation",
            FieldKind::LoanRequest => "loan-request",
            FieldKind::GuaranteeClaim => "guarantee-claim",
            FieldKind::RejectPayment => "reject-payment",
            FieldKind::AllowPayment => "allow-payment",
            FieldKind::GuaranteeClaimGuarantor => "guarantee-claim-guarantor",
        }
    }

    pub fn spec(&self) -> FieldSpec {
        use Envelope::*;
        use KeyScope::*;

        let kind = *self;
        match kind {
            FieldKind::AuthorityNames => {
                FieldSpec::text(kind, "setAuthoritiesNames", "getAuthoritiesNames", OwnerProcess, Bare)
            }
            FieldKind::HashedElements => FieldSpec {
                kind,
                setter: "setElementHashed",
                getter: "getElementHashed",
                key: OwnerProcess,
                elements: 2,
                slots_per_element: 2,
                scheme: Scheme::Utf8Text,
                pad_marker: None,
                envelope: Bare,
            },
            FieldKind::Elements => FieldSpec {
                kind,
                setter: "setElement",
                getter: "getElement",
                key: OwnerProcess,
                elements: 2,
                slots_per_element: 3,
                scheme: Scheme::Binary,
                pad_marker: Some(ELEMENT_PAD_MARKER),
                envelope: Bare,
            },
            FieldKind::PublicParameters => {
                FieldSpec::text(kind, "setPublicParameters", "getPublicParameters", OwnerProcess, Bare)
            }
            FieldKind::PublicKey => {
                FieldSpec::text(kind, "setPublicKey", "getPublicKey", OwnerProcess, Bare)
            }
            FieldKind::MessageIpfsLink => {
                FieldSpec::text(kind, "setIPFSLink", "getIPFSLink", Process, Sender)
            }
            FieldKind::UserAttributes => {
                FieldSpec::text(kind, "setUserAttributes", "getUserAttributes", Process, Bare)
            }
            FieldKind::ReaderPublicKey => {
                FieldSpec::text(kind, "setPublicKeyReaders", "getPublicKeyReaders", Owner, Bare)
            }
            FieldKind::ApplicationForm => FieldSpec::text(
                kind,
                "setApplicationForm",
                "getApplicationForm",
                Process,
                StatusSender,
            ),
            FieldKind::GuaranteeConfirmation => FieldSpec::text(
                kind,
                "setGuaranteeConfirmation",
                "getGuaranteeConfirmation",
                Process,
                StatusSender,
            ),
            FieldKind::LoanRequest => {
                FieldSpec::text(kind, "setLoanRequest", "getLoanRequest", Process, StatusSender)
            }
            FieldKind::GuaranteeClaim => {
                FieldSpec::text(kind, "setGuaranteeClaim", "getGuaranteeClaim", Process, StatusSender)
            }
            FieldKind::RejectPayment => {
                FieldSpec::text(kind, "setRejectPayment", "getRejectPayment", Process, StatusSender)
            }
            FieldKind::AllowPayment => {
                FieldSpec::text(kind, "setAllowPayment", "getAllowPayment", Process, StatusSender)
            }
            FieldKind::GuaranteeClaimGuarantor => FieldSpec::text(
                kind,
                "setGuaranteeClaimGuarantor",
                "getGuaranteeClaimGuarantor",
                Process,
                StatusSender,
            ),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        FieldKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| format!("unknown field '{}'", s))
    }
}
