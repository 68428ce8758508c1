//! Field reads and writes end to end through the in-memory contract.

use alloy::primitives::{Address, B256};

use guarantee_ledger::blockchain::types::LedgerError;
use guarantee_ledger::codec::word::to_word;
use guarantee_ledger::codec::CodecError;
use guarantee_ledger::fields::{FieldKind, RecordKey};

mod common;
use common::{FakeLedger, FakeSigner, OTHER_SENDER, SENDER, SIGNING_KEY};

#[tokio::test]
async fn test_authority_names_round_trip() {
    let ledger = FakeLedger::new();
    let signer = FakeSigner::new();
    let store = common::field_store(&ledger, &signer);

    store
        .write_text(FieldKind::AuthorityNames, &RecordKey::process(42), SENDER, SIGNING_KEY, "AUTH-7")
        .await
        .unwrap();

    let words = ledger
        .stored_words(FieldKind::AuthorityNames, Some(SENDER), Some(42))
        .unwrap();
    assert_eq!(words, vec![to_word(b"QVVUSC03").unwrap(), B256::ZERO]);

    let record = store
        .read(FieldKind::AuthorityNames, &RecordKey::owned(SENDER, 42))
        .await
        .unwrap();
    assert_eq!(record.elements, vec![b"AUTH-7".to_vec()]);
    assert_eq!(record.text().as_deref(), Some("AUTH-7"));
    assert_eq!(record.status, None);
    assert_eq!(record.sender, None);
}

#[tokio::test]
async fn test_binary_elements_round_trip() {
    let ledger = FakeLedger::new();
    let signer = FakeSigner::new();
    let store = common::field_store(&ledger, &signer);

    let first: Vec<u8> = (1..=70).collect();
    let second: Vec<u8> = (100..190).collect();
    store
        .write(
            FieldKind::Elements,
            &RecordKey::process(9),
            SENDER,
            SIGNING_KEY,
            &[first.clone(), second.clone()],
        )
        .await
        .unwrap();

    let words = ledger
        .stored_words(FieldKind::Elements, Some(SENDER), Some(9))
        .unwrap();
    assert_eq!(words.len(), 6);
    assert_eq!(words[0], to_word(&first[..32]).unwrap());
    assert_eq!(words[1], to_word(&first[32..64]).unwrap());
    assert_eq!(words[2], to_word(&[&first[64..], &b"000000"[..]].concat()).unwrap());
    assert_eq!(words[5], to_word(&[&second[64..], &b"000000"[..]].concat()).unwrap());

    let record = store
        .read(FieldKind::Elements, &RecordKey::owned(SENDER, 9))
        .await
        .unwrap();
    assert_eq!(record.elements, vec![first, second]);
}

#[tokio::test]
async fn test_zero_bytes_at_slot_boundaries_survive() {
    let ledger = FakeLedger::new();
    let signer = FakeSigner::new();
    let store = common::field_store(&ledger, &signer);

    let mut first: Vec<u8> = (1..=70).collect();
    first[31] = 0;
    first[63] = 0;
    let mut second: Vec<u8> = (100..164).collect();
    second[31] = 0;
    second[63] = 0;
    store
        .write(
            FieldKind::Elements,
            &RecordKey::process(11),
            SENDER,
            SIGNING_KEY,
            &[first.clone(), second.clone()],
        )
        .await
        .unwrap();

    let words = ledger
        .stored_words(FieldKind::Elements, Some(SENDER), Some(11))
        .unwrap();
    assert_eq!(words[0][31], 0);
    assert_eq!(words[4][31], 0);

    let record = store
        .read(FieldKind::Elements, &RecordKey::owned(SENDER, 11))
        .await
        .unwrap();
    assert_eq!(record.elements, vec![first, second]);
}

#[tokio::test]
async fn test_hashed_elements_round_trip() {
    let ledger = FakeLedger::new();
    let signer = FakeSigner::new();
    let store = common::field_store(&ledger, &signer);

    let g1 = "a".repeat(64);
    let g2 = "0123456789abcdef".repeat(3);
    store
        .write(
            FieldKind::HashedElements,
            &RecordKey::owned(SENDER, 5),
            SENDER,
            SIGNING_KEY,
            &[g1.clone().into_bytes(), g2.clone().into_bytes()],
        )
        .await
        .unwrap();

    let record = store
        .read(FieldKind::HashedElements, &RecordKey::owned(SENDER, 5))
        .await
        .unwrap();
    assert_eq!(record.elements, vec![g1.into_bytes(), g2.into_bytes()]);
}

#[tokio::test]
async fn test_case_field_reports_status_and_sender() {
    let ledger = FakeLedger::new();
    let signer = FakeSigner::new();
    let store = common::field_store(&ledger, &signer);

    let link = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
    store
        .write_text(FieldKind::LoanRequest, &RecordKey::process(7), SENDER, SIGNING_KEY, link)
        .await
        .unwrap();

    let record = store
        .read(FieldKind::LoanRequest, &RecordKey::process(7))
        .await
        .unwrap();
    assert_eq!(record.status, Some(1));
    assert_eq!(record.sender, Some(SENDER));
    assert_eq!(record.text().as_deref(), Some(link));
}

#[tokio::test]
async fn test_message_link_reports_sender() {
    let ledger = FakeLedger::new();
    let signer = FakeSigner::new();
    let store = common::field_store(&ledger, &signer);

    store
        .write_text(FieldKind::MessageIpfsLink, &RecordKey::process(3), SENDER, SIGNING_KEY, "QmMsg")
        .await
        .unwrap();

    let record = store
        .read(FieldKind::MessageIpfsLink, &RecordKey::process(3))
        .await
        .unwrap();
    assert_eq!(record.status, None);
    assert_eq!(record.sender, Some(SENDER));
    assert_eq!(record.text().as_deref(), Some("QmMsg"));
}

#[tokio::test]
async fn test_reader_key_is_owner_scoped() {
    let ledger = FakeLedger::new();
    let signer = FakeSigner::new();
    let store = common::field_store(&ledger, &signer);

    store
        .write_text(FieldKind::ReaderPublicKey, &RecordKey::default(), SENDER, SIGNING_KEY, "reader-pk")
        .await
        .unwrap();

    let mine = store
        .read(FieldKind::ReaderPublicKey, &RecordKey::owner(SENDER))
        .await
        .unwrap();
    assert_eq!(mine.text().as_deref(), Some("reader-pk"));

    let theirs = store
        .read(FieldKind::ReaderPublicKey, &RecordKey::owner(OTHER_SENDER))
        .await
        .unwrap();
    assert!(theirs.is_unwritten());
}

#[tokio::test]
async fn test_unwritten_case_record() {
    let ledger = FakeLedger::new();
    let signer = FakeSigner::new();
    let store = common::field_store(&ledger, &signer);

    let record = store
        .read(FieldKind::AllowPayment, &RecordKey::process(404))
        .await
        .unwrap();
    assert!(record.is_unwritten());
    assert_eq!(record.status, Some(0));
    assert_eq!(record.sender, Some(Address::ZERO));
}

#[tokio::test]
async fn test_oversized_payload_is_not_submitted() {
    let ledger = FakeLedger::new();
    let signer = FakeSigner::new();
    let store = common::field_store(&ledger, &signer);

    // 60 bytes become 80 base64 characters, over the 64-byte record.
    let err = store
        .write_text(
            FieldKind::UserAttributes,
            &RecordKey::process(1),
            SENDER,
            SIGNING_KEY,
            &"x".repeat(60),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LedgerError::Codec(CodecError::PayloadTooLarge { len: 80, capacity: 64 })
    ));
    assert_eq!(ledger.nonce_fetches(), 0);
}

#[tokio::test]
async fn test_key_validation() {
    let ledger = FakeLedger::new();
    let signer = FakeSigner::new();
    let store = common::field_store(&ledger, &signer);

    let err = store
        .read(FieldKind::PublicKey, &RecordKey::process(1))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidRecordKey { field: "public-key", .. }));

    let err = store
        .write_text(
            FieldKind::PublicKey,
            &RecordKey::owned(OTHER_SENDER, 1),
            SENDER,
            SIGNING_KEY,
            "pk",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidRecordKey { .. }));
    assert_eq!(ledger.nonce_fetches(), 0);
}

#[tokio::test]
async fn test_wrong_element_count() {
    let ledger = FakeLedger::new();
    let signer = FakeSigner::new();
    let store = common::field_store(&ledger, &signer);

    let err = store
        .write_text(FieldKind::Elements, &RecordKey::process(1), SENDER, SIGNING_KEY, "one")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Contract(_)));
}

#[tokio::test]
async fn test_activate() {
    let ledger = FakeLedger::new();
    let signer = FakeSigner::new();
    let store = common::field_store(&ledger, &signer);

    let receipt = store.activate(SENDER, SIGNING_KEY).await.unwrap();
    assert_eq!(receipt.nonce, 0);
    assert_eq!(ledger.activations(), 1);
}
