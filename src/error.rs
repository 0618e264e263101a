use thiserror::Error;

/// Fallback shown when a storage upload fails without a message.
pub const UNKNOWN_ERROR: &str = "未知错误";

#[derive(Debug, Error)]
pub enum ArtworkError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Request error: {0}")]
    RequestError(String),

    /// Non-OK answer from the image generation API.
    #[error("Stability API error: {0}")]
    UpstreamError(String),

    #[error("Response error: {0}")]
    ResponseError(String),

    /// Message returned by the generation proxy, shown as-is.
    #[error("{0}")]
    GenerationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Wallet not connected or no image generated")]
    WalletNotConnected,

    #[error("Wrong network: expected chain {expected}, switch failed: {reason}")]
    WrongNetwork { expected: u64, reason: String },

    #[error("Off-chain auth failed: {0}")]
    AuthDerivation(String),

    #[error("Bucket creation failed: {0}")]
    BucketCreation(String),

    #[error("Chain transaction failed: {0}")]
    ChainTransaction(String),

    /// Non-zero code from the storage provider upload; carries its message as-is.
    #[error("Storage upload failed: {0}")]
    StorageUpload(String),

    #[error("Checksum error: {0}")]
    ChecksumError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ArtworkError {
    /// Text shown to the user when an action fails.
    pub fn user_message(&self) -> String {
        match self {
            ArtworkError::WalletNotConnected => "请先连接钱包".to_string(),
            ArtworkError::WrongNetwork { .. } => "请切换到 Greenfield 测试网".to_string(),
            ArtworkError::AuthDerivation(_) => "离线认证失败".to_string(),
            ArtworkError::StorageUpload(msg) if msg.is_empty() => {
                format!("上传失败: {}", UNKNOWN_ERROR)
            }
            ArtworkError::StorageUpload(msg) => format!("上传失败: {}", msg),
            // Upstream and chain errors are surfaced verbatim.
            ArtworkError::BucketCreation(msg) | ArtworkError::ChainTransaction(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ArtworkError {
    fn from(e: serde_json::Error) -> Self {
        ArtworkError::SerializationError(e.to_string())
    }
}

impl From<reqwest::Error> for ArtworkError {
    fn from(e: reqwest::Error) -> Self {
        ArtworkError::RequestError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ArtworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_keeps_prefix() {
        let err = ArtworkError::UpstreamError("Bad Request".into());
        assert_eq!(err.to_string(), "Stability API error: Bad Request");
        assert_eq!(err.user_message(), "Stability API error: Bad Request");
    }

    #[test]
    fn storage_upload_message_is_verbatim() {
        let err = ArtworkError::StorageUpload("object already sealed".into());
        assert_eq!(err.user_message(), "上传失败: object already sealed");

        let empty = ArtworkError::StorageUpload(String::new());
        assert_eq!(empty.user_message(), "上传失败: 未知错误");
    }

    #[test]
    fn wallet_errors_are_localized() {
        assert_eq!(ArtworkError::WalletNotConnected.user_message(), "请先连接钱包");
        let wrong = ArtworkError::WrongNetwork {
            expected: 5600,
            reason: "user rejected".into(),
        };
        assert_eq!(wrong.user_message(), "请切换到 Greenfield 测试网");
        assert_eq!(
            ArtworkError::AuthDerivation("no seed".into()).user_message(),
            "离线认证失败"
        );
    }
}
