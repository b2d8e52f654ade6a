use crate::bridge::{Bridge, StickerBytesOutcome};
use serde_json::Value;
use tauri::{AppHandle, Manager};

/// 按文件名读取贴纸，返回 data URL
#[tauri::command]
pub async fn fetch_sticker_bytes(
    app_handle: AppHandle,
    filename: Option<Value>,
) -> StickerBytesOutcome {
    app_handle
        .state::<Bridge>()
        .fetch_sticker_bytes(filename.unwrap_or_default())
        .await
}
