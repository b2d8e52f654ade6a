//! 图片资源存储模块
//! 负责把用户选中的外部图片复制到应用目录，并以生成的文件名对外引用

use crate::config::StorageLayout;
use crate::error::{Error, Result};
use crate::stamp::StampSource;
use crate::store::ensure_dir;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Cover,
    Sticker,
}

impl AssetKind {
    /// 生成文件名的前缀
    pub fn prefix(&self) -> &'static str {
        match self {
            AssetKind::Cover => "book",
            AssetKind::Sticker => "sticker",
        }
    }

    fn rejects_extension(&self, ext: &str) -> bool {
        match self {
            AssetKind::Cover => false,
            AssetKind::Sticker => ext.eq_ignore_ascii_case("svg"),
        }
    }
}

pub struct AssetImporter {
    covers_dir: PathBuf,
    stickers_dir: PathBuf,
    stamps: Arc<StampSource>,
}

impl AssetImporter {
    pub fn new(layout: &StorageLayout, stamps: Arc<StampSource>) -> Self {
        Self {
            covers_dir: layout.covers_dir.clone(),
            stickers_dir: layout.stickers_dir.clone(),
            stamps,
        }
    }

    pub fn dir_of(&self, kind: AssetKind) -> &Path {
        match kind {
            AssetKind::Cover => &self.covers_dir,
            AssetKind::Sticker => &self.stickers_dir,
        }
    }

    /// 复制图片到对应目录，返回生成的文件名（不含目录）
    /// 文件名格式：`<prefix>_<millis><ext>`，扩展名保留源文件的大小写
    pub async fn import_image(&self, source: &Path, kind: AssetKind) -> Result<String> {
        // 生成的文件名要经 JSON 交给展示层，扩展名必须是合法 UTF-8
        let ext = match source.extension() {
            None => "",
            Some(ext) => ext.to_str().ok_or_else(|| {
                Error::UnsupportedAssetType(format!(".{}", ext.to_string_lossy()))
            })?,
        };

        if kind.rejects_extension(ext) {
            return Err(Error::UnsupportedAssetType(format!(".{}", ext)));
        }

        let dir = self.dir_of(kind);
        ensure_dir(dir).await?;

        let file_name = if ext.is_empty() {
            format!("{}_{}", kind.prefix(), self.stamps.next())
        } else {
            format!("{}_{}.{}", kind.prefix(), self.stamps.next(), ext)
        };

        fs::copy(source, dir.join(&file_name))
            .await
            .map_err(Error::CopyFailed)?;

        tracing::info!(kind = kind.prefix(), file = %file_name, "image imported");
        Ok(file_name)
    }

    /// 把文件名解析为目录内的完整路径；含路径分隔符或 `..` 的名字直接拒绝
    pub fn resolve(&self, kind: AssetKind, file_name: &str) -> Result<PathBuf> {
        if !is_safe_file_name(file_name) {
            return Err(Error::InvalidAssetName(file_name.to_string()));
        }
        Ok(self.dir_of(kind).join(file_name))
    }

    /// 读取贴纸并编码为 data URL
    pub async fn sticker_data_url(&self, file_name: &str) -> Result<String> {
        let path = self.resolve(AssetKind::Sticker, file_name)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::AssetNotFound(file_name.to_string()));
            }
            Err(e) => return Err(Error::ReadFailed(e)),
        };
        Ok(to_data_url(&bytes))
    }
}

/// 仅允许单个普通路径段作为文件名
pub fn is_safe_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(|c: char| matches!(c, '/' | '\\' | ':' | '\0')) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// 根据文件头判断图片 MIME
fn guess_image_mime(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else if data.starts_with(b"GIF8") {
        "image/gif"
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        "image/webp"
    } else if data.starts_with(b"BM") {
        "image/bmp"
    } else {
        "image/jpeg"
    }
}

pub fn to_data_url(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", guess_image_mime(bytes), STANDARD.encode(bytes))
}
