use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::IMAGE_PNG;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisibilityType {
    VisibilityTypePublicRead,
    VisibilityTypePrivate,
    VisibilityTypeInherit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedundancyType {
    RedundancyEcType,
    RedundancyReplicaType,
}

/// Where an image lands in the storage network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTarget {
    pub bucket_name: String,
    pub object_name: String,
    pub content_type: String,
}

impl UploadTarget {
    /// Object names only differ by millisecond timestamp.
    pub fn at(bucket_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            object_name: format!("artwork-{}.png", now.timestamp_millis()),
            content_type: IMAGE_PNG.to_string(),
        }
    }

    pub fn now(bucket_name: impl Into<String>) -> Self {
        Self::at(bucket_name, Utc::now())
    }
}

/// Ordered integrity hashes: the primary checksum followed by one per
/// erasure-coded shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumSet(pub Vec<[u8; 32]>);

impl ChecksumSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn primary(&self) -> Option<&[u8; 32]> {
        self.0.first()
    }

    pub fn to_base64(&self) -> Vec<String> {
        self.0.iter().map(|c| STANDARD.encode(c)).collect()
    }

    pub fn to_bytes(&self) -> Vec<Vec<u8>> {
        self.0.iter().map(|c| c.to_vec()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffchainAuthCredential {
    pub seed: String,
    pub domain: String,
    pub address: String,
}

/// Storage provider chosen for an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpInfo {
    pub id: u32,
    pub endpoint: String,
    pub primary_sp_address: String,
    pub seal_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBucketMsg {
    pub bucket_name: String,
    pub creator: String,
    pub primary_sp_address: String,
    pub visibility: VisibilityType,
    pub charged_read_quota: u64,
    pub payment_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateObjectMsg {
    pub bucket_name: String,
    pub object_name: String,
    pub creator: String,
    pub visibility: VisibilityType,
    pub content_type: String,
    pub expect_checksums: Vec<Vec<u8>>,
    pub redundancy_type: RedundancyType,
    pub payload_size: u64,
}

/// Unsigned message handed to the chain client for simulate/broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transaction {
    CreateBucket(CreateBucketMsg),
    CreateObject(CreateObjectMsg),
}

impl Transaction {
    pub fn kind(&self) -> &'static str {
        match self {
            Transaction::CreateBucket(_) => "create_bucket",
            Transaction::CreateObject(_) => "create_object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulateInfo {
    pub gas_limit: u64,
    pub gas_price: Option<String>,
    pub gas_fee: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasOptions {
    pub denom: String,
    pub gas_limit: u64,
    pub gas_price: String,
    pub payer: String,
    pub granter: String,
}

impl GasOptions {
    /// Uses the simulated price when the node reported one.
    pub fn from_simulation(
        info: &SimulateInfo,
        denom: &str,
        fallback_gas_price: &str,
        payer: &str,
    ) -> Self {
        Self {
            denom: denom.to_string(),
            gas_limit: info.gas_limit,
            gas_price: info
                .gas_price
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| fallback_gas_price.to_string()),
            payer: payer.to_string(),
            granter: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResponse {
    pub code: u32,
    pub transaction_hash: String,
    pub raw_log: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadObjectRequest {
    pub bucket_name: String,
    pub object_name: String,
    pub body: Vec<u8>,
    pub txn_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum AuthDescriptor {
    Eddsa {
        domain: String,
        seed: String,
        address: String,
    },
}

impl From<&OffchainAuthCredential> for AuthDescriptor {
    fn from(credential: &OffchainAuthCredential) -> Self {
        AuthDescriptor::Eddsa {
            domain: credential.domain.clone(),
            seed: credential.seed.clone(),
            address: credential.address.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub code: i32,
    pub message: Option<String>,
}
