use serde::{Deserialize, Serialize};

pub const IMAGE_PNG: &str = "image/png";

/// Opaque handle to the wallet's signing provider, passed through to
/// off-chain auth derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderHandle {
    pub connector: String,
}

impl ProviderHandle {
    pub fn new(connector: impl Into<String>) -> Self {
        Self {
            connector: connector.into(),
        }
    }
}
