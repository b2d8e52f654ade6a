use crate::assets::is_safe_file_name;
use crate::error::{Error, Result};
use crate::models::{Book, BookCollection, BookDraft};
use crate::stamp::StampSource;
use crate::store::{DocumentKey, DocumentStore};
use chrono::{SecondsFormat, Utc};
use std::collections::HashSet;
use std::sync::Arc;

pub struct CollectionRepository {
    store: Arc<DocumentStore>,
    stamps: Arc<StampSource>,
}

impl CollectionRepository {
    pub fn new(store: Arc<DocumentStore>, stamps: Arc<StampSource>) -> Self {
        Self { store, stamps }
    }

    pub async fn load_collection(&self) -> BookCollection {
        self.store
            .read(DocumentKey::Collection, BookCollection::default())
            .await
    }

    pub async fn list_books(&self) -> Vec<Book> {
        self.load_collection().await.collection
    }

    /// 整体替换集合文档
    pub async fn save_collection(&self, document: &BookCollection) -> Result<()> {
        validate_collection(document)?;
        self.store.write(DocumentKey::Collection, document).await
    }

    /// 新建书籍并追加到集合末尾，返回落盘后的记录
    pub async fn create_book(&self, draft: BookDraft) -> Result<Book> {
        if let Some(cover) = draft.cover_path.as_deref() {
            validate_cover_path(cover)?;
        }

        let stamps = self.stamps.clone();
        let book = self
            .store
            .update(DocumentKey::Collection, BookCollection::default(), move |doc| {
                let mut id = format!("book_{}", stamps.next());
                // 磁盘上可能已有同名 ID（例如时钟回拨后重启）
                while doc.contains_id(&id) {
                    id = format!("book_{}", stamps.next());
                }
                let book = draft.into_book(id, now_iso8601());
                doc.collection.push(book.clone());
                Ok(book)
            })
            .await?;

        tracing::info!(id = ?book.id, "book created");
        Ok(book)
    }

    /// 按 ID 删除书籍；ID 不存在时视为成功
    pub async fn remove_book(&self, id: &str) -> Result<()> {
        let removed = self
            .store
            .update(DocumentKey::Collection, BookCollection::default(), |doc| {
                let before = doc.collection.len();
                doc.collection.retain(|b| b.id.as_deref() != Some(id));
                Ok(before - doc.collection.len())
            })
            .await?;

        if removed == 0 {
            tracing::debug!(id, "remove_book: no matching book");
        }
        Ok(())
    }
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 封面只能是 book-covers 目录下的文件名；空字符串表示无封面
pub(crate) fn validate_cover_path(cover: &str) -> Result<()> {
    if cover.is_empty() || is_safe_file_name(cover) {
        Ok(())
    } else {
        Err(Error::InvalidCoverPath(cover.to_string()))
    }
}

fn validate_collection(document: &BookCollection) -> Result<()> {
    let mut seen = HashSet::new();
    for book in &document.collection {
        if let Some(cover) = book.cover_path.as_deref() {
            validate_cover_path(cover)?;
        }
        if let Some(id) = book.id.as_deref().filter(|id| !id.is_empty()) {
            if !seen.insert(id) {
                return Err(Error::DuplicateBookId(id.to_string()));
            }
        }
    }
    Ok(())
}
