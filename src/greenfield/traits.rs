use crate::{
    error::Result,
    models::{
        AuthDescriptor, BroadcastResponse, GasOptions, OffchainAuthCredential, ProviderHandle,
        SimulateInfo, SpInfo, Transaction, UploadObjectRequest, UploadResponse,
    },
};
use async_trait::async_trait;

/// Chain and storage-provider operations of the Greenfield SDK.
#[async_trait]
pub trait GreenfieldClient: Send + Sync {
    /// Pick the primary storage provider. Called once per operation;
    /// implementations must not cache silently.
    async fn select_sp(&self) -> Result<SpInfo>;

    async fn simulate(&self, tx: &Transaction, denom: &str) -> Result<SimulateInfo>;

    async fn broadcast(&self, tx: &Transaction, gas: &GasOptions) -> Result<BroadcastResponse>;

    async fn upload_object(
        &self,
        request: UploadObjectRequest,
        auth: &AuthDescriptor,
    ) -> Result<UploadResponse>;
}

/// The connected browser wallet.
#[async_trait]
pub trait Wallet: Send + Sync {
    fn address(&self) -> Option<String>;

    fn is_connected(&self) -> bool;

    fn chain_id(&self) -> Option<u64>;

    /// Ask the user to switch networks. Rejection is an error.
    async fn switch_network(&self, chain_id: u64) -> Result<()>;

    async fn provider(&self) -> Result<ProviderHandle>;
}

/// Derives the off-chain signing seed bound to a wallet address.
#[async_trait]
pub trait OffchainAuthProvider: Send + Sync {
    async fn get_offchain_auth_keys(
        &self,
        address: &str,
        provider: &ProviderHandle,
    ) -> Result<Option<OffchainAuthCredential>>;
}
