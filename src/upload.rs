//! Upload of a generated image to Greenfield.
//!
//! A run walks [`UploadState`] strictly forward:
//!
//! ```text
//! PreconditionCheck -> EnsureBucket -> ObtainAuth -> PrepareChecksums
//!     -> CreateObject -> UploadBytes -> Done
//! ```
//!
//! Any error moves the run to `Failed` and stops it. There is no retry and no
//! rollback: an object created on chain stays there even if the byte upload
//! fails afterwards. A new run always starts from `PreconditionCheck`.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::{
    checksum::compute_checksums,
    config::GreenfieldConfig,
    error::{ArtworkError, Result},
    greenfield::{GreenfieldClient, OffchainAuthProvider, StorageManager, Wallet},
    models::{
        ChecksumSet, GenerationResult, OffchainAuthCredential, ProviderHandle, UploadResponse,
        UploadTarget,
    },
};

pub const STATUS_PREPARING: &str = "准备上传...";
pub const STATUS_CREATING_OBJECT: &str = "正在创建对象...";
pub const STATUS_UPLOADING: &str = "对象创建完成，正在上传文件...";
pub const STATUS_DONE: &str = "上传完成！";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    PreconditionCheck,
    EnsureBucket,
    ObtainAuth,
    PrepareChecksums,
    CreateObject,
    UploadBytes,
    Done,
    Failed,
}

impl UploadState {
    /// Successor after a successful step. Terminal states have none.
    pub fn next(self) -> Option<UploadState> {
        use UploadState::*;
        match self {
            PreconditionCheck => Some(EnsureBucket),
            EnsureBucket => Some(ObtainAuth),
            ObtainAuth => Some(PrepareChecksums),
            PrepareChecksums => Some(CreateObject),
            CreateObject => Some(UploadBytes),
            UploadBytes => Some(Done),
            Done | Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, UploadState::Done | UploadState::Failed)
    }

    /// Status text entering this state sets, if any. A fresh run and
    /// `Failed` clear it.
    pub fn status_message(self) -> Option<&'static str> {
        match self {
            UploadState::PreconditionCheck => Some(""),
            UploadState::EnsureBucket => Some(STATUS_PREPARING),
            UploadState::CreateObject => Some(STATUS_CREATING_OBJECT),
            UploadState::UploadBytes => Some(STATUS_UPLOADING),
            UploadState::Done => Some(STATUS_DONE),
            UploadState::Failed => Some(""),
            _ => None,
        }
    }
}

/// What the presentation layer sees while a run is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub state: UploadState,
    pub status: String,
}

impl Default for UploadProgress {
    fn default() -> Self {
        Self {
            state: UploadState::PreconditionCheck,
            status: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub target: UploadTarget,
    pub transaction_hash: String,
    pub checksums: ChecksumSet,
    pub response: UploadResponse,
}

/// Values produced by earlier steps and consumed by later ones.
#[derive(Default)]
struct RunContext {
    address: String,
    provider: Option<ProviderHandle>,
    credential: Option<OffchainAuthCredential>,
    body: Vec<u8>,
    target: Option<UploadTarget>,
    checksums: Option<ChecksumSet>,
    transaction_hash: Option<String>,
    response: Option<UploadResponse>,
}

fn missing(what: &str) -> ArtworkError {
    ArtworkError::InternalError(format!("{} not available in this state", what))
}

pub struct Uploader {
    config: Arc<GreenfieldConfig>,
    storage: StorageManager,
    wallet: Arc<dyn Wallet>,
    auth: Arc<dyn OffchainAuthProvider>,
    progress: watch::Sender<UploadProgress>,
}

impl Uploader {
    pub fn new(
        config: Arc<GreenfieldConfig>,
        client: Arc<dyn GreenfieldClient>,
        wallet: Arc<dyn Wallet>,
        auth: Arc<dyn OffchainAuthProvider>,
    ) -> Self {
        let (progress, _) = watch::channel(UploadProgress::default());
        Self {
            storage: StorageManager::new(client, config.clone()),
            config,
            wallet,
            auth,
            progress,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadProgress> {
        self.progress.subscribe()
    }

    pub fn status_stream(&self) -> WatchStream<UploadProgress> {
        WatchStream::new(self.subscribe())
    }

    pub fn progress(&self) -> UploadProgress {
        self.progress.borrow().clone()
    }

    /// Run every step for `image`, stopping at the first failure.
    pub async fn run(&self, image: Option<&GenerationResult>) -> Result<UploadOutcome> {
        let _timer = crate::logger::timer("greenfield upload");
        let mut ctx = RunContext::default();
        let mut state = UploadState::PreconditionCheck;
        self.enter(state);

        loop {
            if let Err(e) = self.step(state, image, &mut ctx).await {
                log::error!("Upload failed in {:?}: {}", state, e);
                self.enter(UploadState::Failed);
                return Err(e);
            }

            match state.next() {
                Some(next) => {
                    state = next;
                    self.enter(state);
                }
                None => break,
            }
        }

        Ok(UploadOutcome {
            target: ctx.target.ok_or_else(|| missing("upload target"))?,
            transaction_hash: ctx.transaction_hash.ok_or_else(|| missing("transaction hash"))?,
            checksums: ctx.checksums.ok_or_else(|| missing("checksums"))?,
            response: ctx.response.ok_or_else(|| missing("upload response"))?,
        })
    }

    fn enter(&self, state: UploadState) {
        log::debug!("Upload state -> {:?}", state);
        self.progress.send_modify(|progress| {
            progress.state = state;
            if let Some(status) = state.status_message() {
                progress.status = status.to_string();
            }
        });
    }

    async fn step(
        &self,
        state: UploadState,
        image: Option<&GenerationResult>,
        ctx: &mut RunContext,
    ) -> Result<()> {
        match state {
            UploadState::PreconditionCheck => self.check_preconditions(image, ctx).await,
            UploadState::EnsureBucket => {
                ctx.provider = Some(self.wallet.provider().await?);
                self.storage.ensure_bucket(&ctx.address).await
            }
            UploadState::ObtainAuth => {
                let provider = ctx.provider.as_ref().ok_or_else(|| missing("provider"))?;
                let credential = self
                    .auth
                    .get_offchain_auth_keys(&ctx.address, provider)
                    .await
                    .map_err(|e| ArtworkError::AuthDerivation(e.to_string()))?
                    .ok_or_else(|| {
                        ArtworkError::AuthDerivation("no credential for wallet".into())
                    })?;
                ctx.credential = Some(credential);
                Ok(())
            }
            UploadState::PrepareChecksums => {
                let image = image.ok_or(ArtworkError::WalletNotConnected)?;
                ctx.body = image.image.clone();
                ctx.target = Some(UploadTarget::now(&self.config.bucket_name));
                let checksums = compute_checksums(&ctx.body)?;
                log::info!("Computed checksums over {} bytes", ctx.body.len());
                log::debug!("Expect checksums: {:?}", checksums.to_base64());
                ctx.checksums = Some(checksums);
                Ok(())
            }
            UploadState::CreateObject => {
                let target = ctx.target.as_ref().ok_or_else(|| missing("upload target"))?;
                let checksums = ctx.checksums.as_ref().ok_or_else(|| missing("checksums"))?;
                let hash = self
                    .storage
                    .create_object(&ctx.address, target, checksums, ctx.body.len() as u64)
                    .await?;
                log::info!("Object {} created in tx {}", target.object_name, hash);
                ctx.transaction_hash = Some(hash);
                Ok(())
            }
            UploadState::UploadBytes => {
                let target = ctx.target.as_ref().ok_or_else(|| missing("upload target"))?;
                let hash = ctx
                    .transaction_hash
                    .as_deref()
                    .ok_or_else(|| missing("transaction hash"))?;
                let credential = ctx.credential.as_ref().ok_or_else(|| missing("credential"))?;
                let body = std::mem::take(&mut ctx.body);
                let response = self.storage.upload(target, body, hash, credential).await?;
                ctx.response = Some(response);
                Ok(())
            }
            UploadState::Done | UploadState::Failed => Ok(()),
        }
    }

    async fn check_preconditions(
        &self,
        image: Option<&GenerationResult>,
        ctx: &mut RunContext,
    ) -> Result<()> {
        let address = match (image, self.wallet.address()) {
            (Some(_), Some(address)) if self.wallet.is_connected() => address,
            _ => return Err(ArtworkError::WalletNotConnected),
        };

        let expected = self.config.chain_id();
        if self.wallet.chain_id() != Some(expected) {
            log::info!("Requesting network switch to chain {}", expected);
            self.wallet
                .switch_network(expected)
                .await
                .map_err(|e| ArtworkError::WrongNetwork {
                    expected,
                    reason: e.to_string(),
                })?;
        }

        ctx.address = address;
        Ok(())
    }
}
