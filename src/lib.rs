pub mod assets;
pub mod bridge;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod stamp;
pub mod store;

#[cfg(feature = "desktop")]
mod commands;

#[cfg(feature = "desktop")]
use commands::*;

use tracing_subscriber::EnvFilter;

/// 日志默认只输出本 crate 的 info 级别，可用 RUST_LOG 覆盖
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("book_wall_lib=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use tauri::Manager;

    init_tracing();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            // 文档与图片统一放在应用数据目录下
            let app_data_dir = app.path().app_data_dir()?;
            let layout = config::StorageLayout::resolve(&app_data_dir);
            tracing::info!(root = %layout.root.display(), "storage layout resolved");
            app.manage(bridge::Bridge::new(&layout));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            load_profile,
            save_profile,
            load_collection,
            save_collection,
            create_book,
            remove_book,
            import_cover_image,
            import_sticker_image,
            fetch_sticker_bytes,
            pick_image_file
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
