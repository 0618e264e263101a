//! In-memory stand-ins for the wallet, off-chain auth and Greenfield SDK.
//!
//! Compiled for unit tests and behind the `test-util` feature for the
//! integration tests under `tests/`. Every mock records the calls it receives
//! so tests can assert on ordering.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    error::{ArtworkError, Result},
    greenfield::{GreenfieldClient, OffchainAuthProvider, Wallet},
    models::{
        AuthDescriptor, BroadcastResponse, GasOptions, GenerationRequest, GenerationResult,
        OffchainAuthCredential, ProviderHandle, SimulateInfo, SpInfo, Transaction,
        UploadObjectRequest, UploadResponse,
    },
    proxy::ImageGenerator,
};

pub const TEST_ADDRESS: &str = "0x8f3a1c2b4d5e6f708192a3b4c5d6e7f801234567";

/// Smallest valid PNG: a 1x1 transparent pixel.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

pub const TEST_TX_HASH: &str = "8A1F3C0E5B2D47A6B9C0D1E2F3A4B5C6D7E8F90123456789ABCDEF0123456789";

#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    SelectSp,
    Simulate {
        kind: &'static str,
    },
    Broadcast {
        kind: &'static str,
        gas: GasOptions,
    },
    CreateObjectChecksums {
        checksums: Vec<Vec<u8>>,
        payload_size: u64,
    },
    Upload {
        txn_hash: String,
        body_len: usize,
        auth: AuthDescriptor,
    },
}

enum BucketBehaviour {
    /// First creation succeeds, later ones fail with "already exists".
    Chain,
    Error(String),
    Response(u32, String),
}

pub struct MockGreenfield {
    calls: Mutex<Vec<MockCall>>,
    buckets: Mutex<HashSet<String>>,
    bucket: BucketBehaviour,
    simulated_price: Option<String>,
    object_hash: String,
    object_error: Option<String>,
    upload_response: UploadResponse,
}

impl Default for MockGreenfield {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            buckets: Mutex::new(HashSet::new()),
            bucket: BucketBehaviour::Chain,
            simulated_price: Some("5000000000".to_string()),
            object_hash: TEST_TX_HASH.to_string(),
            object_error: None,
            upload_response: UploadResponse {
                code: 0,
                message: Some("upload success".to_string()),
            },
        }
    }
}

impl MockGreenfield {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing_bucket(self, bucket_name: &str) -> Self {
        self.buckets
            .lock()
            .unwrap()
            .insert(bucket_name.to_string());
        self
    }

    pub fn with_bucket_error(mut self, message: &str) -> Self {
        self.bucket = BucketBehaviour::Error(message.to_string());
        self
    }

    pub fn with_bucket_response(mut self, code: u32, raw_log: &str) -> Self {
        self.bucket = BucketBehaviour::Response(code, raw_log.to_string());
        self
    }

    pub fn without_simulated_price(mut self) -> Self {
        self.simulated_price = None;
        self
    }

    pub fn with_object_hash(mut self, hash: &str) -> Self {
        self.object_hash = hash.to_string();
        self
    }

    pub fn with_object_error(mut self, message: &str) -> Self {
        self.object_error = Some(message.to_string());
        self
    }

    pub fn with_upload_response(mut self, code: i32, message: Option<&str>) -> Self {
        self.upload_response = UploadResponse {
            code,
            message: message.map(str::to_string),
        };
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<MockCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, MockCall::Upload { .. }))
            .collect()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn broadcast_bucket(&self, bucket_name: &str) -> Result<BroadcastResponse> {
        match &self.bucket {
            BucketBehaviour::Chain => {
                let mut buckets = self.buckets.lock().unwrap();
                if !buckets.insert(bucket_name.to_string()) {
                    return Err(ArtworkError::RequestError(format!(
                        "rpc error: Bucket already exists: {}",
                        bucket_name
                    )));
                }
                Ok(BroadcastResponse {
                    code: 0,
                    transaction_hash: "BUCKET".to_string(),
                    raw_log: None,
                })
            }
            BucketBehaviour::Error(message) => Err(ArtworkError::RequestError(message.clone())),
            BucketBehaviour::Response(code, raw_log) => Ok(BroadcastResponse {
                code: *code,
                transaction_hash: String::new(),
                raw_log: Some(raw_log.clone()),
            }),
        }
    }
}

#[async_trait]
impl GreenfieldClient for MockGreenfield {
    async fn select_sp(&self) -> Result<SpInfo> {
        self.record(MockCall::SelectSp);
        Ok(SpInfo {
            id: 1,
            endpoint: "https://gnfd-testnet-sp1.bnbchain.org".to_string(),
            primary_sp_address: "0x89A1CC91B642DECbC4789474694C606E0E0c420b".to_string(),
            seal_address: None,
        })
    }

    async fn simulate(&self, tx: &Transaction, _denom: &str) -> Result<SimulateInfo> {
        self.record(MockCall::Simulate { kind: tx.kind() });
        Ok(SimulateInfo {
            gas_limit: 2400,
            gas_price: self.simulated_price.clone(),
            gas_fee: None,
        })
    }

    async fn broadcast(&self, tx: &Transaction, gas: &GasOptions) -> Result<BroadcastResponse> {
        self.record(MockCall::Broadcast {
            kind: tx.kind(),
            gas: gas.clone(),
        });

        match tx {
            Transaction::CreateBucket(msg) => self.broadcast_bucket(&msg.bucket_name),
            Transaction::CreateObject(msg) => {
                self.record(MockCall::CreateObjectChecksums {
                    checksums: msg.expect_checksums.clone(),
                    payload_size: msg.payload_size,
                });
                if let Some(message) = &self.object_error {
                    return Err(ArtworkError::RequestError(message.clone()));
                }
                Ok(BroadcastResponse {
                    code: 0,
                    transaction_hash: self.object_hash.clone(),
                    raw_log: None,
                })
            }
        }
    }

    async fn upload_object(
        &self,
        request: UploadObjectRequest,
        auth: &AuthDescriptor,
    ) -> Result<UploadResponse> {
        self.record(MockCall::Upload {
            txn_hash: request.txn_hash.clone(),
            body_len: request.body.len(),
            auth: auth.clone(),
        });
        Ok(self.upload_response.clone())
    }
}

pub struct MockWallet {
    address: Option<String>,
    chain_id: Mutex<Option<u64>>,
    reject_switch: bool,
    switch_requests: AtomicUsize,
}

impl MockWallet {
    /// A connected wallet already on `chain_id`.
    pub fn connected(chain_id: u64) -> Self {
        Self {
            address: Some(TEST_ADDRESS.to_string()),
            chain_id: Mutex::new(Some(chain_id)),
            reject_switch: false,
            switch_requests: AtomicUsize::new(0),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            address: None,
            chain_id: Mutex::new(None),
            reject_switch: false,
            switch_requests: AtomicUsize::new(0),
        }
    }

    pub fn rejecting_switch(mut self) -> Self {
        self.reject_switch = true;
        self
    }

    pub fn switch_requests(&self) -> usize {
        self.switch_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Wallet for MockWallet {
    fn address(&self) -> Option<String> {
        self.address.clone()
    }

    fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    fn chain_id(&self) -> Option<u64> {
        *self.chain_id.lock().unwrap()
    }

    async fn switch_network(&self, chain_id: u64) -> Result<()> {
        self.switch_requests.fetch_add(1, Ordering::SeqCst);
        if self.reject_switch {
            return Err(ArtworkError::RequestError("User rejected the request.".into()));
        }
        *self.chain_id.lock().unwrap() = Some(chain_id);
        Ok(())
    }

    async fn provider(&self) -> Result<ProviderHandle> {
        Ok(ProviderHandle::new("mock-injected"))
    }
}

pub struct MockAuth {
    domain: String,
    available: bool,
    requests: AtomicUsize,
}

impl MockAuth {
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            available: true,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OffchainAuthProvider for MockAuth {
    async fn get_offchain_auth_keys(
        &self,
        address: &str,
        _provider: &ProviderHandle,
    ) -> Result<Option<OffchainAuthCredential>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if !self.available {
            return Ok(None);
        }
        Ok(Some(OffchainAuthCredential {
            seed: format!("seed-{}", self.requests()),
            domain: self.domain.clone(),
            address: address.to_string(),
        }))
    }
}

/// Image generator answering without any network.
pub struct MockGenerator {
    result: std::result::Result<Vec<u8>, String>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerator {
    pub fn png() -> Self {
        Self {
            result: Ok(TINY_PNG.to_vec()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for MockGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        self.requests.lock().unwrap().push(request);
        match &self.result {
            Ok(bytes) => Ok(GenerationResult::new(bytes.clone(), "http://localhost:3000")),
            Err(message) => Err(ArtworkError::GenerationFailed(message.clone())),
        }
    }
}
