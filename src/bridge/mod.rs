//! 受信任宿主与展示层之间的固定操作集合
//! 每个操作一一对应一个仓库/导入方法；返回值中只会出现生成的文件名，不会出现宿主路径

pub mod outcome;

use crate::assets::{AssetImporter, AssetKind};
use crate::config::StorageLayout;
use crate::error::{Error, Result};
use crate::models::{BookCollection, BookDraft, UserProfile};
use crate::repository::{CollectionRepository, ProfileRepository};
use crate::stamp::StampSource;
use crate::store::DocumentStore;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

pub use outcome::{CreateBookOutcome, ImportOutcome, PickOutcome, StickerBytesOutcome, WriteOutcome};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 外部图片来源（桌面端为系统文件选择框）；取消时返回 None
pub trait ImageSource: Send + Sync {
    fn pick_image(&self) -> BoxFuture<'_, Option<PathBuf>>;
}

/// 操作目录，名称与展示层调用名一致
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadProfile,
    SaveProfile,
    LoadCollection,
    SaveCollection,
    CreateBook,
    RemoveBook,
    ImportCoverImage,
    ImportStickerImage,
    FetchStickerBytes,
    PickImageFile,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::LoadProfile,
        Operation::SaveProfile,
        Operation::LoadCollection,
        Operation::SaveCollection,
        Operation::CreateBook,
        Operation::RemoveBook,
        Operation::ImportCoverImage,
        Operation::ImportStickerImage,
        Operation::FetchStickerBytes,
        Operation::PickImageFile,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::LoadProfile => "load-profile",
            Operation::SaveProfile => "save-profile",
            Operation::LoadCollection => "load-collection",
            Operation::SaveCollection => "save-collection",
            Operation::CreateBook => "create-book",
            Operation::RemoveBook => "remove-book",
            Operation::ImportCoverImage => "import-cover-image",
            Operation::ImportStickerImage => "import-sticker-image",
            Operation::FetchStickerBytes => "fetch-sticker-bytes",
            Operation::PickImageFile => "pick-image-file",
        }
    }

    /// 对应的 tauri 命令名
    pub fn command_name(&self) -> String {
        self.name().replace('-', "_")
    }
}

/// 只持有各仓库的句柄，调用之间不保留任何状态
pub struct Bridge {
    profiles: ProfileRepository,
    books: CollectionRepository,
    assets: AssetImporter,
}

impl Bridge {
    pub fn new(layout: &StorageLayout) -> Self {
        let store = Arc::new(DocumentStore::new(layout.data_dir.clone()));
        let stamps = Arc::new(StampSource::new());
        Self {
            profiles: ProfileRepository::new(store.clone()),
            books: CollectionRepository::new(store, stamps.clone()),
            assets: AssetImporter::new(layout, stamps),
        }
    }

    pub async fn load_profile(&self) -> UserProfile {
        tracing::debug!(op = Operation::LoadProfile.name());
        self.profiles.load_profile().await
    }

    pub async fn save_profile(&self, payload: Value) -> WriteOutcome {
        tracing::debug!(op = Operation::SaveProfile.name());
        let result = match decode::<UserProfile>(payload) {
            Ok(profile) => self.profiles.save_profile(&profile).await,
            Err(e) => Err(e),
        };
        report(Operation::SaveProfile, result).into()
    }

    pub async fn load_collection(&self) -> BookCollection {
        tracing::debug!(op = Operation::LoadCollection.name());
        self.books.load_collection().await
    }

    /// 请求体为完整的 `{ collection, ... }` 文档，顶层其他字段一并保存
    pub async fn save_collection(&self, payload: Value) -> WriteOutcome {
        let result = match decode::<BookCollection>(payload) {
            Ok(document) => {
                tracing::debug!(
                    op = Operation::SaveCollection.name(),
                    books = document.collection.len()
                );
                self.books.save_collection(&document).await
            }
            Err(e) => Err(e),
        };
        report(Operation::SaveCollection, result).into()
    }

    pub async fn create_book(&self, payload: Value) -> CreateBookOutcome {
        tracing::debug!(op = Operation::CreateBook.name());
        let result = match decode::<BookDraft>(payload) {
            Ok(draft) => self.books.create_book(draft).await,
            Err(e) => Err(e),
        };
        report(Operation::CreateBook, result).into()
    }

    pub async fn remove_book(&self, payload: Value) -> WriteOutcome {
        let result = match decode::<String>(payload) {
            Ok(id) => {
                tracing::debug!(op = Operation::RemoveBook.name(), id = %id);
                self.books.remove_book(&id).await
            }
            Err(e) => Err(e),
        };
        report(Operation::RemoveBook, result).into()
    }

    pub async fn import_cover_image(&self, source: &dyn ImageSource) -> ImportOutcome {
        self.import_image(source, AssetKind::Cover, Operation::ImportCoverImage).await
    }

    pub async fn import_sticker_image(&self, source: &dyn ImageSource) -> ImportOutcome {
        self.import_image(source, AssetKind::Sticker, Operation::ImportStickerImage).await
    }

    pub async fn fetch_sticker_bytes(&self, payload: Value) -> StickerBytesOutcome {
        let result = match decode::<String>(payload) {
            Ok(file_name) => {
                tracing::debug!(op = Operation::FetchStickerBytes.name(), file = %file_name);
                self.assets.sticker_data_url(&file_name).await
            }
            Err(e) => Err(e),
        };
        report(Operation::FetchStickerBytes, result).into()
    }

    /// 只返回选中文件的显示名
    pub async fn pick_image_file(&self, source: &dyn ImageSource) -> PickOutcome {
        tracing::debug!(op = Operation::PickImageFile.name());
        let file_name = source.pick_image().await.and_then(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        });
        PickOutcome {
            success: file_name.is_some(),
            file_name,
        }
    }

    async fn import_image(
        &self,
        source: &dyn ImageSource,
        kind: AssetKind,
        op: Operation,
    ) -> ImportOutcome {
        tracing::debug!(op = op.name());
        let Some(path) = source.pick_image().await else {
            return ImportOutcome::cancelled();
        };
        report(op, self.assets.import_image(&path, kind).await).into()
    }
}

/// 展示层传入的请求体，类型不符时转为失败结果而不是调用错误
fn decode<T: DeserializeOwned>(payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(Error::InvalidPayload)
}

fn report<T>(op: Operation, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        tracing::warn!(op = op.name(), error = %e, "bridge operation failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;
    use tempfile::TempDir;

    struct FixedSource(Option<PathBuf>);

    impl ImageSource for FixedSource {
        fn pick_image(&self) -> BoxFuture<'_, Option<PathBuf>> {
            let picked = self.0.clone();
            Box::pin(async move { picked })
        }
    }

    fn bridge_in(dir: &TempDir) -> Bridge {
        Bridge::new(&StorageLayout::from_root(dir.path().join("app")))
    }

    fn picked(dir: &TempDir, name: &str, bytes: &[u8]) -> FixedSource {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        FixedSource(Some(path))
    }

    #[test]
    fn test_catalog_is_closed_and_unique() {
        let names: HashSet<_> = Operation::ALL.iter().map(|op| op.name()).collect();
        assert_eq!(names.len(), 10);
        assert_eq!(Operation::ImportStickerImage.command_name(), "import_sticker_image");
    }

    #[tokio::test]
    async fn test_profile_round_trip_through_bridge() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge_in(&dir);

        let mut profile = bridge.load_profile().await;
        assert_eq!(profile, UserProfile::default());

        profile.username = "Ada".into();
        profile.is_first_time = false;
        let payload = serde_json::to_value(&profile).unwrap();
        assert!(bridge.save_profile(payload).await.success);
        assert_eq!(bridge.load_profile().await, profile);
    }

    #[tokio::test]
    async fn test_create_and_remove_through_bridge() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge_in(&dir);

        let created = bridge.create_book(json!({ "title": "Book 1" })).await;
        assert!(created.success);
        let id = created.book.and_then(|b| b.id).unwrap();

        assert_eq!(bridge.load_collection().await.collection.len(), 1);
        assert_eq!(bridge.remove_book(json!(id)).await, WriteOutcome { success: true, error: None });
        assert!(bridge.load_collection().await.collection.is_empty());
    }

    #[tokio::test]
    async fn test_save_collection_failure_is_a_value() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge_in(&dir);
        let document = json!({
            "collection": [{ "id": "book_1", "coverPath": "..\\..\\secrets.png" }]
        });

        let outcome = bridge.save_collection(document).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("Invalid cover path"));
    }

    #[tokio::test]
    async fn test_save_collection_keeps_top_level_fields() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge_in(&dir);
        let document = json!({
            "collection": [{ "id": "book_1", "title": "A", "coverPath": "book_1.png" }],
            "version": 1
        });

        assert!(bridge.save_collection(document.clone()).await.success);
        let loaded = serde_json::to_value(bridge.load_collection().await).unwrap();
        assert_eq!(loaded, document);
    }

    #[tokio::test]
    async fn test_mistyped_payloads_fail_as_values() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge_in(&dir);

        let saved = bridge.save_profile(json!("Ada")).await;
        assert!(!saved.success);
        assert!(saved.error.unwrap().contains("Invalid payload"));

        let saved = bridge.save_collection(json!({ "collection": 5 })).await;
        assert!(!saved.success);
        assert!(saved.error.unwrap().contains("Invalid payload"));

        let created = bridge.create_book(json!(["title"])).await;
        assert!(!created.success);
        assert!(created.book.is_none());

        assert!(!bridge.remove_book(json!(42)).await.success);
        assert!(!bridge.fetch_sticker_bytes(Value::Null).await.success);

        // 失败的请求不会写入任何文档
        assert!(!dir.path().join("app").join("data").exists());
    }

    #[tokio::test]
    async fn test_import_cover_returns_file_name_only() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge_in(&dir);
        let source = picked(&dir, "scan.png", b"\x89PNG....");

        let outcome = bridge.import_cover_image(&source).await;
        assert!(outcome.success);
        let name = outcome.file_path.unwrap();
        assert!(name.starts_with("book_") && name.ends_with(".png"));
        assert!(!name.contains('/') && !name.contains('\\'));

        let stored = dir.path().join("app").join("book-covers").join(&name);
        assert_eq!(std::fs::read(stored).unwrap(), b"\x89PNG....");
    }

    #[tokio::test]
    async fn test_import_sticker_svg_is_rejected() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge_in(&dir);
        let source = picked(&dir, "vector.svg", b"<svg/>");

        let outcome = bridge.import_sticker_image(&source).await;
        assert!(!outcome.success);
        assert!(outcome.file_path.is_none());
        assert!(outcome.error.unwrap().contains(".svg"));
    }

    #[tokio::test]
    async fn test_cancelled_picker() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge_in(&dir);
        let none = FixedSource(None);

        assert_eq!(bridge.import_cover_image(&none).await, ImportOutcome::cancelled());
        assert_eq!(
            bridge.pick_image_file(&none).await,
            PickOutcome { success: false, file_name: None }
        );
    }

    #[tokio::test]
    async fn test_pick_image_file_hides_directory() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge_in(&dir);
        let source = picked(&dir, "cat.webp", b"RIFF");

        let outcome = bridge.pick_image_file(&source).await;
        assert_eq!(outcome.file_name.as_deref(), Some("cat.webp"));
    }

    #[tokio::test]
    async fn test_fetch_imported_sticker() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge_in(&dir);
        let source = picked(&dir, "star.gif", b"GIF89a-star");

        let name = bridge.import_sticker_image(&source).await.file_path.unwrap();
        let fetched = bridge.fetch_sticker_bytes(json!(name)).await;
        assert!(fetched.success);
        assert!(fetched.data.unwrap().starts_with("data:image/gif;base64,"));

        let escaped = bridge.fetch_sticker_bytes(json!("../data/user.json")).await;
        assert!(!escaped.success);
        assert!(escaped.data.is_none());
    }
}
