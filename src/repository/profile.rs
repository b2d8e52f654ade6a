use crate::assets::is_safe_file_name;
use crate::error::{Error, Result};
use crate::models::UserProfile;
use crate::store::{DocumentKey, DocumentStore};
use std::sync::Arc;

/// 用户资料只支持整体读写，调用方自行读改写
pub struct ProfileRepository {
    store: Arc<DocumentStore>,
}

impl ProfileRepository {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn load_profile(&self) -> UserProfile {
        self.store
            .read(DocumentKey::Profile, UserProfile::default())
            .await
    }

    pub async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        for src in profile.custom_stickers.iter().filter_map(|s| s.src.as_deref()) {
            if !is_safe_file_name(src) {
                return Err(Error::InvalidAssetName(src.to_string()));
            }
        }
        self.store.write(DocumentKey::Profile, profile).await
    }
}
