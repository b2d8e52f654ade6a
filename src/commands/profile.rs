use crate::bridge::{Bridge, WriteOutcome};
use crate::models::UserProfile;
use serde_json::Value;
use tauri::{AppHandle, Manager};

#[tauri::command]
pub async fn load_profile(app_handle: AppHandle) -> UserProfile {
    app_handle.state::<Bridge>().load_profile().await
}

#[tauri::command]
pub async fn save_profile(app_handle: AppHandle, profile: Option<Value>) -> WriteOutcome {
    app_handle
        .state::<Bridge>()
        .save_profile(profile.unwrap_or_default())
        .await
}
