//! JSON 文档存储
//! 每个文档对应数据目录下的一个文件；同一文档的读、写、读改写按键串行执行

use crate::error::{Error, Result};
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    Profile,
    Collection,
}

impl DocumentKey {
    pub fn file_name(&self) -> &'static str {
        match self {
            DocumentKey::Profile => "user.json",
            DocumentKey::Collection => "books.json",
        }
    }
}

pub struct DocumentStore {
    data_dir: PathBuf,
    locks: DashMap<DocumentKey, Arc<Mutex<()>>>,
}

impl DocumentStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            locks: DashMap::new(),
        }
    }

    pub fn path_of(&self, key: DocumentKey) -> PathBuf {
        self.data_dir.join(key.file_name())
    }

    /// 读取文档；文件缺失、不可读或内容损坏时返回 `fallback`
    pub async fn read<T: DeserializeOwned>(&self, key: DocumentKey, fallback: T) -> T {
        let _guard = self.lock(key).await;
        self.load(key).await.unwrap_or(fallback)
    }

    /// 整体写入文档，必要时创建数据目录
    pub async fn write<T: Serialize>(&self, key: DocumentKey, document: &T) -> Result<()> {
        let _guard = self.lock(key).await;
        self.persist(key, document).await
    }

    /// 读改写：整个周期内持有该文档的锁，闭包返回错误时不落盘
    pub async fn update<T, R, F>(&self, key: DocumentKey, fallback: T, mutate: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T) -> Result<R>,
    {
        let _guard = self.lock(key).await;
        let mut document = self.load(key).await.unwrap_or(fallback);
        let output = mutate(&mut document)?;
        self.persist(key, &document).await?;
        Ok(output)
    }

    async fn lock(&self, key: DocumentKey) -> OwnedMutexGuard<()> {
        // 先克隆出 Arc 再 await，避免跨 await 持有 DashMap 分片锁
        let lock = self.locks.entry(key).or_default().clone();
        lock.lock_owned().await
    }

    async fn load<T: DeserializeOwned>(&self, key: DocumentKey) -> Option<T> {
        let path = self.path_of(key);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(document = key.file_name(), "document missing, using fallback");
                return None;
            }
            Err(e) => {
                tracing::warn!(document = key.file_name(), error = %e, "document unreadable, using fallback");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!(document = key.file_name(), error = %e, "document corrupt, using fallback");
                None
            }
        }
    }

    async fn persist<T: Serialize>(&self, key: DocumentKey, document: &T) -> Result<()> {
        let mut json = serde_json::to_string_pretty(document)?;
        json.push('\n');

        ensure_dir(&self.data_dir).await?;

        // 先写临时文件再替换，读取方不会看到写了一半的文档
        let path = self.path_of(key);
        let tmp = path.with_extension("json.tmp");
        let io_err = |source: std::io::Error| Error::Io {
            key: key.file_name(),
            source,
        };
        fs::write(&tmp, json.as_bytes()).await.map_err(io_err)?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(io_err(e));
        }

        tracing::info!(document = key.file_name(), bytes = json.len(), "document saved");
        Ok(())
    }
}

/// 创建目录；目录已存在（包括并发创建）不算错误
pub(crate) async fn ensure_dir(path: &Path) -> Result<()> {
    let source = match fs::create_dir_all(path).await {
        Ok(()) => return Ok(()),
        Err(source) => source,
    };
    match fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        _ => Err(Error::CreateDir {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> DocumentStore {
        DocumentStore::new(dir.path().join("data"))
    }

    #[tokio::test]
    async fn test_read_missing_returns_fallback() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let doc: Value = store.read(DocumentKey::Profile, json!({ "fallback": true })).await;
        assert_eq!(doc, json!({ "fallback": true }));
    }

    #[tokio::test]
    async fn test_read_corrupt_returns_fallback() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(store.path_of(DocumentKey::Collection), "{ not json").unwrap();

        let doc: Value = store.read(DocumentKey::Collection, json!({ "collection": [] })).await;
        assert_eq!(doc, json!({ "collection": [] }));
    }

    #[tokio::test]
    async fn test_write_creates_dir_and_pretty_prints() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .write(DocumentKey::Profile, &json!({ "username": "Ada" }))
            .await
            .unwrap();

        let content = std::fs::read_to_string(store.path_of(DocumentKey::Profile)).unwrap();
        assert_eq!(content, "{\n  \"username\": \"Ada\"\n}\n");
        // 临时文件已被替换
        assert!(!dir.path().join("data").join("user.json.tmp").exists());

        // 目录已存在时再次写入
        store
            .write(DocumentKey::Profile, &json!({ "username": "Grace" }))
            .await
            .unwrap();
        let doc: Value = store.read(DocumentKey::Profile, Value::Null).await;
        assert_eq!(doc, json!({ "username": "Grace" }));
    }

    #[tokio::test]
    async fn test_write_fails_when_data_dir_is_a_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("data"), b"occupied").unwrap();
        let store = store_in(&dir);

        let result = store.write(DocumentKey::Profile, &json!({})).await;
        assert!(matches!(result, Err(Error::CreateDir { .. })));
    }

    #[tokio::test]
    async fn test_ensure_dir_accepts_existing_dir_only() {
        let dir = TempDir::new().unwrap();
        let covers = dir.path().join("book-covers");

        ensure_dir(&covers).await.unwrap();
        ensure_dir(&covers).await.unwrap();
        assert!(covers.is_dir());

        let occupied = dir.path().join("stickers");
        std::fs::write(&occupied, b"occupied").unwrap();
        assert!(matches!(
            ensure_dir(&occupied).await,
            Err(Error::CreateDir { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_mutation_is_not_persisted() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let result: Result<()> = store
            .update(DocumentKey::Collection, json!({ "n": 0 }), |doc| {
                doc["n"] = json!(1);
                Err(Error::DuplicateBookId("book_1".into()))
            })
            .await;
        assert!(result.is_err());
        assert!(!store.path_of(DocumentKey::Collection).exists());
    }

    #[tokio::test]
    async fn test_concurrent_updates_do_not_lose_writes() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&dir));

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..32 {
            let store = store.clone();
            tasks.spawn(async move {
                store
                    .update(DocumentKey::Collection, json!({ "items": [] }), |doc| {
                        doc["items"]
                            .as_array_mut()
                            .expect("items array")
                            .push(json!(i));
                        Ok(())
                    })
                    .await
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        let doc: Value = store.read(DocumentKey::Collection, Value::Null).await;
        assert_eq!(doc["items"].as_array().unwrap().len(), 32);
    }
}
