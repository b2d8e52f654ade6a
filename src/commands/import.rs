use crate::bridge::{BoxFuture, Bridge, ImageSource, ImportOutcome, PickOutcome};
use crate::config::IMAGE_EXTENSIONS;
use std::path::PathBuf;
use tauri::{AppHandle, Manager};
use tauri_plugin_dialog::DialogExt;
use tokio::sync::oneshot;

/// 系统文件选择框，只显示图片
pub struct DialogPicker {
    app_handle: AppHandle,
}

impl DialogPicker {
    pub fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl ImageSource for DialogPicker {
    fn pick_image(&self) -> BoxFuture<'_, Option<PathBuf>> {
        let (tx, rx) = oneshot::channel();
        self.app_handle
            .dialog()
            .file()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file(move |picked| {
                let _ = tx.send(picked.and_then(|p| p.into_path().ok()));
            });
        Box::pin(async move { rx.await.ok().flatten() })
    }
}

#[tauri::command]
pub async fn import_cover_image(app_handle: AppHandle) -> ImportOutcome {
    let picker = DialogPicker::new(app_handle.clone());
    app_handle
        .state::<Bridge>()
        .import_cover_image(&picker)
        .await
}

#[tauri::command]
pub async fn import_sticker_image(app_handle: AppHandle) -> ImportOutcome {
    let picker = DialogPicker::new(app_handle.clone());
    app_handle
        .state::<Bridge>()
        .import_sticker_image(&picker)
        .await
}

#[tauri::command]
pub async fn pick_image_file(app_handle: AppHandle) -> PickOutcome {
    let picker = DialogPicker::new(app_handle.clone());
    app_handle.state::<Bridge>().pick_image_file(&picker).await
}
