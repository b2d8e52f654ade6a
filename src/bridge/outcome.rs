//! 桥接层返回值：失败以 `{ success: false, error }` 的形式返回，不抛出到调用方

use crate::error::Error;
use crate::models::Book;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<(), Error>> for WriteOutcome {
    fn from(result: Result<(), Error>) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                error: None,
            },
            Err(e) => Self {
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateBookOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<Book, Error>> for CreateBookOutcome {
    fn from(result: Result<Book, Error>) -> Self {
        match result {
            Ok(book) => Self {
                success: true,
                book: Some(book),
                error: None,
            },
            Err(e) => Self {
                success: false,
                book: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// `filePath` 只携带生成的文件名
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImportOutcome {
    /// 用户取消了文件选择
    pub fn cancelled() -> Self {
        Self {
            success: false,
            file_path: None,
            error: None,
        }
    }
}

impl From<Result<String, Error>> for ImportOutcome {
    fn from(result: Result<String, Error>) -> Self {
        match result {
            Ok(name) => Self {
                success: true,
                file_path: Some(name),
                error: None,
            },
            Err(e) => Self {
                success: false,
                file_path: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StickerBytesOutcome {
    pub success: bool,
    /// data URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<String, Error>> for StickerBytesOutcome {
    fn from(result: Result<String, Error>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(e) => Self {
                success: false,
                data: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}
