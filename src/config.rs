//! 存储目录布局
//! 所有文档与图片都位于同一个应用数据根目录之下

use std::path::{Path, PathBuf};

/// 覆盖应用数据根目录的环境变量
pub const DATA_DIR_ENV: &str = "BOOK_WALL_DATA_DIR";

/// 文件选择器允许的图片扩展名
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub root: PathBuf,
    /// `data/`：user.json、books.json
    pub data_dir: PathBuf,
    /// `book-covers/`
    pub covers_dir: PathBuf,
    /// `stickers/`
    pub stickers_dir: PathBuf,
}

impl StorageLayout {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            data_dir: root.join("data"),
            covers_dir: root.join("book-covers"),
            stickers_dir: root.join("stickers"),
            root,
        }
    }

    /// 环境变量优先，否则使用宿主解析出的应用数据目录
    pub fn resolve(default_root: &Path) -> Self {
        Self::resolve_with(std::env::var(DATA_DIR_ENV).ok(), default_root)
    }

    fn resolve_with(override_root: Option<String>, default_root: &Path) -> Self {
        match override_root {
            Some(dir) if !dir.trim().is_empty() => Self::from_root(dir.trim()),
            _ => Self::from_root(default_root),
        }
    }
}
