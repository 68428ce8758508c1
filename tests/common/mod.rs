//! Shared fakes for integration testing.
//!
//! `FakeLedger` is an in-memory chain plus contract: it enforces nonces,
//! stores setter calls per record key and answers getter calls with the
//! envelope each field declares. `FakeSigner` produces raw bytes the fake
//! ledger can read back (`nonce ++ sender ++ input`).

#![allow(dead_code)]

use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::json_abi::Function;
use alloy::primitives::{keccak256, Address, Bytes, Selector, TxHash, B256, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use guarantee_ledger::blockchain::types::{
    BlockchainConfig, LedgerError, LedgerResult, Receipt, SubmissionConfig,
};
use guarantee_ledger::blockchain::{LedgerRpc, Submitter, TransactionIntent, TransactionSigner};
use guarantee_ledger::fields::{Envelope, FieldKind, FieldStore, KeyScope};
use guarantee_ledger::resilience::{NeverRetry, RetryPolicy};

pub const SENDER: Address = Address::repeat_byte(0x5e);
pub const OTHER_SENDER: Address = Address::repeat_byte(0x6f);
pub const CONTRACT: Address = Address::repeat_byte(0xcc);
pub const SIGNING_KEY: &str = "fake-signing-key";

type RecordId = (FieldKind, Option<Address>, Option<u64>);

struct Stored {
    sender: Address,
    words: Vec<B256>,
}

pub struct FakeLedger {
    next_nonce: AtomicU64,
    nonce_fetches: AtomicU32,
    pending_rejections: AtomicU32,
    offline: AtomicBool,
    never_mine: AtomicBool,
    revert: AtomicBool,
    gas_price_wei: AtomicU64,
    block: AtomicU64,
    activations: AtomicU32,
    broadcast_nonces: Mutex<Vec<u64>>,
    receipts: Mutex<HashMap<TxHash, Receipt>>,
    records: Mutex<HashMap<RecordId, Stored>>,
    setters: HashMap<Selector, (FieldKind, Function)>,
    getters: HashMap<Selector, (FieldKind, Function)>,
    activate: Selector,
}

impl FakeLedger {
    pub fn new() -> Arc<Self> {
        let mut setters = HashMap::new();
        let mut getters = HashMap::new();
        for kind in FieldKind::ALL {
            let spec = kind.spec();
            let setter = Function::parse(&spec.setter_signature()).unwrap();
            let getter = Function::parse(&spec.getter_signature()).unwrap();
            setters.insert(setter.selector(), (kind, setter));
            getters.insert(getter.selector(), (kind, getter));
        }
        let activate = Function::parse("function updateMajorityCount()")
            .unwrap()
            .selector();

        Arc::new(Self {
            next_nonce: AtomicU64::new(0),
            nonce_fetches: AtomicU32::new(0),
            pending_rejections: AtomicU32::new(0),
            offline: AtomicBool::new(false),
            never_mine: AtomicBool::new(false),
            revert: AtomicBool::new(false),
            gas_price_wei: AtomicU64::new(20_000_000_000),
            block: AtomicU64::new(100),
            activations: AtomicU32::new(0),
            broadcast_nonces: Mutex::new(Vec::new()),
            receipts: Mutex::new(HashMap::new()),
            records: Mutex::new(HashMap::new()),
            setters,
            getters,
            activate,
        })
    }

    /// Reject the next `n` broadcasts.
    pub fn reject_next(&self, n: u32) {
        self.pending_rejections.store(n, Ordering::SeqCst);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_never_mine(&self, never_mine: bool) {
        self.never_mine.store(never_mine, Ordering::SeqCst);
    }

    pub fn set_revert(&self, revert: bool) {
        self.revert.store(revert, Ordering::SeqCst);
    }

    pub fn set_gas_price_gwei(&self, gwei: u64) {
        self.gas_price_wei.store(gwei * 1_000_000_000, Ordering::SeqCst);
    }

    pub fn nonce_fetches(&self) -> u32 {
        self.nonce_fetches.load(Ordering::SeqCst)
    }

    pub fn activations(&self) -> u32 {
        self.activations.load(Ordering::SeqCst)
    }

    /// Nonces of accepted broadcasts, in acceptance order.
    pub fn broadcast_nonces(&self) -> Vec<u64> {
        self.broadcast_nonces.lock().unwrap().clone()
    }

    /// Raw contract words of a stored record.
    pub fn stored_words(&self, field: FieldKind, owner: Option<Address>, id: Option<u64>) -> Option<Vec<B256>> {
        self.records
            .lock()
            .unwrap()
            .get(&(field, owner, id))
            .map(|stored| stored.words.clone())
    }

    fn check_online(&self) -> LedgerResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::RpcUnavailable("connection refused".to_string()));
        }
        Ok(())
    }

    fn apply(&self, sender: Address, input: &[u8]) {
        if input.len() < 4 {
            return;
        }
        let selector = Selector::from_slice(&input[..4]);
        if selector == self.activate {
            self.activations.fetch_add(1, Ordering::SeqCst);
            return;
        }
        let Some((kind, setter)) = self.setters.get(&selector) else {
            return;
        };

        let mut values = setter.abi_decode_input(&input[4..]).unwrap().into_iter();
        let spec = kind.spec();
        let id = match spec.key {
            KeyScope::Owner => None,
            _ => Some(as_u64(values.next())),
        };
        let owner = match spec.key {
            KeyScope::Process => None,
            _ => Some(sender),
        };
        let words = values.map(as_word).collect();

        self.records
            .lock()
            .unwrap()
            .insert((*kind, owner, id), Stored { sender, words });
    }

    fn answer(&self, input: &[u8]) -> LedgerResult<Bytes> {
        let selector = Selector::from_slice(&input[..4]);
        let (kind, getter) = self
            .getters
            .get(&selector)
            .ok_or_else(|| LedgerError::RpcUnavailable("execution reverted".to_string()))?;

        let mut args = getter.abi_decode_input(&input[4..]).unwrap().into_iter();
        let spec = kind.spec();
        let owner = match spec.key {
            KeyScope::Process => None,
            _ => Some(as_address(args.next())),
        };
        let id = match spec.key {
            KeyScope::Owner => None,
            _ => Some(as_u64(args.next())),
        };

        let records = self.records.lock().unwrap();
        let stored = records.get(&(*kind, owner, id));
        let (status, sender, words) = match stored {
            Some(s) => (1u8, s.sender, s.words.clone()),
            None => (0u8, Address::ZERO, vec![B256::ZERO; spec.word_count()]),
        };

        let mut out = Vec::new();
        match spec.envelope {
            Envelope::Bare => {}
            Envelope::Sender => out.push(DynSolValue::Address(sender)),
            Envelope::StatusSender => {
                out.push(DynSolValue::Uint(U256::from(status), 8));
                out.push(DynSolValue::Address(sender));
            }
        }
        out.extend(words.into_iter().map(|w| DynSolValue::FixedBytes(w, 32)));

        Ok(Bytes::from(DynSolValue::Tuple(out).abi_encode_params()))
    }
}

fn as_u64(value: Option<DynSolValue>) -> u64 {
    match value {
        Some(DynSolValue::Uint(v, _)) => v.to::<u64>(),
        other => panic!("expected uint, got {:?}", other),
    }
}

fn as_address(value: Option<DynSolValue>) -> Address {
    match value {
        Some(DynSolValue::Address(a)) => a,
        other => panic!("expected address, got {:?}", other),
    }
}

fn as_word(value: DynSolValue) -> B256 {
    match value {
        DynSolValue::FixedBytes(w, 32) => w,
        other => panic!("expected bytes32, got {:?}", other),
    }
}

#[async_trait]
impl LedgerRpc for FakeLedger {
    async fn transaction_count(&self, _address: Address) -> LedgerResult<u64> {
        self.check_online()?;
        self.nonce_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.next_nonce.load(Ordering::SeqCst))
    }

    async fn gas_price(&self) -> LedgerResult<u128> {
        self.check_online()?;
        Ok(self.gas_price_wei.load(Ordering::SeqCst) as u128)
    }

    async fn estimate_gas(&self, _from: Address, _to: Address, _input: &Bytes) -> LedgerResult<u64> {
        self.check_online()?;
        Ok(90_000)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> LedgerResult<TxHash> {
        self.check_online()?;

        let pending = self.pending_rejections.load(Ordering::SeqCst);
        if pending > 0 {
            self.pending_rejections.store(pending - 1, Ordering::SeqCst);
            return Err(LedgerError::RpcUnavailable(
                "Broadcast rejected: replacement transaction underpriced".to_string(),
            ));
        }

        let nonce = u64::from_be_bytes(raw[..8].try_into().unwrap());
        let sender = Address::from_slice(&raw[8..28]);
        let expected = self.next_nonce.load(Ordering::SeqCst);
        if nonce != expected {
            return Err(LedgerError::RpcUnavailable(format!(
                "Broadcast rejected: nonce {} expected {}",
                nonce, expected
            )));
        }
        self.next_nonce.fetch_add(1, Ordering::SeqCst);
        self.broadcast_nonces.lock().unwrap().push(nonce);

        let success = !self.revert.load(Ordering::SeqCst);
        if success {
            self.apply(sender, &raw[28..]);
        }

        let tx_hash = keccak256(raw);
        let block_number = self.block.fetch_add(1, Ordering::SeqCst) + 1;
        self.receipts.lock().unwrap().insert(
            tx_hash,
            Receipt {
                tx_hash,
                block_number: Some(block_number),
                gas_used: 42_000,
                success,
            },
        );
        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> LedgerResult<Option<Receipt>> {
        self.check_online()?;
        if self.never_mine.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.receipts.lock().unwrap().get(&tx_hash).cloned())
    }

    /// Every query sees one more block.
    async fn block_number(&self) -> LedgerResult<u64> {
        self.check_online()?;
        Ok(self.block.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn call(&self, _to: Address, input: Bytes) -> LedgerResult<Bytes> {
        self.check_online()?;
        self.answer(&input)
    }
}

/// Signer that encodes `nonce ++ sender ++ input` instead of an RLP transaction.
#[derive(Default)]
pub struct FakeSigner {
    fail: AtomicBool,
    signed: Mutex<Vec<TransactionIntent>>,
}

impl FakeSigner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn signed(&self) -> Vec<TransactionIntent> {
        self.signed.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionSigner for FakeSigner {
    async fn sign(&self, intent: &TransactionIntent, private_key: &str) -> LedgerResult<Bytes> {
        if self.fail.load(Ordering::SeqCst) || private_key != SIGNING_KEY {
            return Err(LedgerError::Signing("invalid private key".to_string()));
        }
        self.signed.lock().unwrap().push(intent.clone());

        let mut raw = intent.nonce.to_be_bytes().to_vec();
        raw.extend_from_slice(intent.sender.as_slice());
        raw.extend_from_slice(&intent.input);
        Ok(Bytes::from(raw))
    }
}

pub fn chain_config() -> BlockchainConfig {
    let mut config = BlockchainConfig::default();
    config.contract_address = CONTRACT.to_string();
    config
}

/// Fast polling and a one second confirmation timeout.
pub fn submission_config() -> SubmissionConfig {
    let mut config = SubmissionConfig::default();
    config.confirmation_timeout_secs = 1;
    config.poll_interval_ms = 10;
    config.interactive = false;
    config.retry_base_delay_ms = 1;
    config.retry_max_delay_ms = 5;
    config
}

pub fn submitter(
    ledger: &Arc<FakeLedger>,
    signer: &Arc<FakeSigner>,
    policy: Arc<dyn RetryPolicy>,
    settings: SubmissionConfig,
) -> Submitter {
    Submitter::new(ledger.clone(), signer.clone(), policy, chain_config(), settings)
}

pub fn field_store(ledger: &Arc<FakeLedger>, signer: &Arc<FakeSigner>) -> FieldStore {
    let submitter = submitter(ledger, signer, Arc::new(NeverRetry), submission_config());
    FieldStore::new(ledger.clone(), Arc::new(submitter), CONTRACT).unwrap()
}
