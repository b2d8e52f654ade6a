use crate::bridge::{Bridge, CreateBookOutcome, WriteOutcome};
use crate::models::BookCollection;
use serde_json::Value;
use tauri::{AppHandle, Manager};

// 请求体不在命令签名处反序列化，类型不符时由 Bridge 返回 `{success: false, error}`

#[tauri::command]
pub async fn load_collection(app_handle: AppHandle) -> BookCollection {
    app_handle.state::<Bridge>().load_collection().await
}

/// 前端以 `invoke("save_collection", { document })` 整体保存 `{ collection, ... }`
#[tauri::command]
pub async fn save_collection(app_handle: AppHandle, document: Option<Value>) -> WriteOutcome {
    app_handle
        .state::<Bridge>()
        .save_collection(document.unwrap_or_default())
        .await
}

#[tauri::command]
pub async fn create_book(app_handle: AppHandle, book: Option<Value>) -> CreateBookOutcome {
    app_handle
        .state::<Bridge>()
        .create_book(book.unwrap_or_default())
        .await
}

#[tauri::command]
pub async fn remove_book(app_handle: AppHandle, id: Option<Value>) -> WriteOutcome {
    app_handle
        .state::<Bridge>()
        .remove_book(id.unwrap_or_default())
        .await
}
