//! 统一错误类型
//! 读取失败不在此列：文档缺失或损坏一律回落到默认值

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to write document {key}: {source}")]
    Io {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Copy failed: {0}")]
    CopyFailed(#[source] std::io::Error),

    #[error("Read failed: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Unsupported image type: {0}")]
    UnsupportedAssetType(String),

    #[error("Invalid asset filename: {0:?}")]
    InvalidAssetName(String),

    #[error("Invalid cover path: {0:?}")]
    InvalidCoverPath(String),

    #[error("Duplicate book id: {0}")]
    DuplicateBookId(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
