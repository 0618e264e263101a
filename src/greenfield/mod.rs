pub mod traits;

use crate::{
    config::GreenfieldConfig,
    error::{ArtworkError, Result},
    models::{
        AuthDescriptor, BroadcastResponse, ChecksumSet, CreateBucketMsg, CreateObjectMsg,
        GasOptions, OffchainAuthCredential, RedundancyType, Transaction, UploadObjectRequest,
        UploadResponse, UploadTarget, VisibilityType,
    },
};
use std::sync::Arc;

pub use traits::{GreenfieldClient, OffchainAuthProvider, Wallet};

/// Substring the chain reports when a bucket is already taken.
pub const BUCKET_EXISTS: &str = "already exists";

/// Bucket and object operations against the configured network.
pub struct StorageManager {
    backend: Arc<dyn GreenfieldClient>,
    config: Arc<GreenfieldConfig>,
}

impl StorageManager {
    pub fn new(backend: Arc<dyn GreenfieldClient>, config: Arc<GreenfieldConfig>) -> Self {
        Self { backend, config }
    }

    /// Simulate for gas, then broadcast.
    pub async fn submit(&self, tx: Transaction, payer: &str) -> Result<BroadcastResponse> {
        let simulation = self.backend.simulate(&tx, &self.config.denom).await?;
        log::debug!(
            "Simulated {}: gas_limit={} gas_price={:?}",
            tx.kind(),
            simulation.gas_limit,
            simulation.gas_price
        );

        let gas = GasOptions::from_simulation(
            &simulation,
            &self.config.denom,
            &self.config.fallback_gas_price,
            payer,
        );
        let response = self.backend.broadcast(&tx, &gas).await?;
        log::info!(
            "Broadcast {}: code={} hash={}",
            tx.kind(),
            response.code,
            response.transaction_hash
        );
        Ok(response)
    }

    /// Create the shared bucket. An existing bucket counts as success, and a
    /// rejected broadcast is only logged; an `Err` from the backend aborts.
    pub async fn ensure_bucket(&self, creator: &str) -> Result<()> {
        match self.create_bucket(creator).await {
            Ok(response) if response.code == 0 => {
                log::info!("Bucket {} created", self.config.bucket_name);
                Ok(())
            }
            Ok(response) => {
                let raw_log = response.raw_log.unwrap_or_default();
                if raw_log.contains(BUCKET_EXISTS) {
                    log::info!("Bucket {} already exists", self.config.bucket_name);
                } else {
                    // Not created, but only a failed broadcast stops the run.
                    log::warn!(
                        "Bucket {} not created (code {}): {}",
                        self.config.bucket_name,
                        response.code,
                        raw_log
                    );
                }
                Ok(())
            }
            Err(e) if e.to_string().contains(BUCKET_EXISTS) => {
                log::info!("Bucket {} already exists", self.config.bucket_name);
                Ok(())
            }
            Err(e @ ArtworkError::BucketCreation(_)) => Err(e),
            Err(e) => Err(ArtworkError::BucketCreation(e.to_string())),
        }
    }

    async fn create_bucket(&self, creator: &str) -> Result<BroadcastResponse> {
        let sp = self.backend.select_sp().await?;
        log::debug!("Using storage provider {} ({})", sp.primary_sp_address, sp.endpoint);

        let tx = Transaction::CreateBucket(CreateBucketMsg {
            bucket_name: self.config.bucket_name.clone(),
            creator: creator.to_string(),
            primary_sp_address: sp.primary_sp_address,
            visibility: VisibilityType::VisibilityTypePublicRead,
            charged_read_quota: 0,
            payment_address: creator.to_string(),
        });
        self.submit(tx, creator).await
    }

    /// Register the object on chain and return the accepted transaction hash.
    pub async fn create_object(
        &self,
        creator: &str,
        target: &UploadTarget,
        checksums: &ChecksumSet,
        payload_size: u64,
    ) -> Result<String> {
        let tx = Transaction::CreateObject(CreateObjectMsg {
            bucket_name: target.bucket_name.clone(),
            object_name: target.object_name.clone(),
            creator: creator.to_string(),
            visibility: VisibilityType::VisibilityTypePublicRead,
            content_type: target.content_type.clone(),
            expect_checksums: checksums.to_bytes(),
            redundancy_type: RedundancyType::RedundancyEcType,
            payload_size,
        });

        let response = self
            .submit(tx, creator)
            .await
            .map_err(|e| ArtworkError::ChainTransaction(e.to_string()))?;

        if response.code != 0 {
            return Err(ArtworkError::ChainTransaction(format!(
                "create object returned code {}: {}",
                response.code,
                response.raw_log.unwrap_or_default()
            )));
        }
        if response.transaction_hash.is_empty() {
            return Err(ArtworkError::ChainTransaction(
                "create object returned no transaction hash".into(),
            ));
        }

        Ok(response.transaction_hash)
    }

    pub async fn upload(
        &self,
        target: &UploadTarget,
        body: Vec<u8>,
        txn_hash: &str,
        credential: &OffchainAuthCredential,
    ) -> Result<UploadResponse> {
        if txn_hash.is_empty() {
            return Err(ArtworkError::InternalError(
                "upload requires the create object transaction hash".into(),
            ));
        }

        let request = UploadObjectRequest {
            bucket_name: target.bucket_name.clone(),
            object_name: target.object_name.clone(),
            body,
            txn_hash: txn_hash.to_string(),
        };

        let response = self
            .backend
            .upload_object(request, &AuthDescriptor::from(credential))
            .await
            .map_err(|e| ArtworkError::StorageUpload(e.to_string()))?;

        if response.code != 0 {
            return Err(ArtworkError::StorageUpload(
                response.message.clone().unwrap_or_default(),
            ));
        }
        Ok(response)
    }
}
