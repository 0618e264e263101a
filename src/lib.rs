//! AI artwork generation proxy and Greenfield upload flow.
//!
//! The [`server`] module exposes `POST /api/generate-image`, which forwards a
//! multipart form to the Stability image API. The [`upload`] module drives a
//! generated image through bucket creation, checksum computation, on-chain
//! object creation and the storage-provider upload. Chain, wallet and
//! off-chain auth access sit behind the traits in [`greenfield`].

pub mod checksum;
pub mod config;
pub mod error;
pub mod greenfield;
pub mod logger;
pub mod models;
pub mod proxy;
#[cfg(feature = "server")]
pub mod server;
pub mod session;
pub mod stability;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod upload;

pub use config::{ChainDescriptor, Config, GreenfieldConfig, StabilityConfig};
pub use error::{ArtworkError, Result};
pub use greenfield::{GreenfieldClient, OffchainAuthProvider, StorageManager, Wallet};
pub use models::*;
pub use proxy::{ImageGenerator, ProxyClient};
pub use session::ArtworkSession;
pub use stability::{ImageClient, StabilityClient};
pub use upload::{UploadOutcome, UploadProgress, UploadState, Uploader};
