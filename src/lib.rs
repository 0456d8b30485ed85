pub mod camera;
pub mod history;
pub mod matching;
pub mod models;
pub mod photo;
pub mod settings;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use camera::commands::{
    capture_photo, check_camera_permissions, get_camera_state, retry_camera, start_camera,
    stop_camera, switch_camera,
};
use camera::{CameraConfig, CameraController, SystemCamera};
use history::commands::{
    add_detection, clear_detection_history, get_detection_history, get_history_stats,
};
use history::HistoryStore;
use log::warn;
use matching::commands::{add_animal, add_disease, check_symptoms, get_animal, get_disease};
use matching::HttpDiseaseService;
use settings::{ServiceSettings, SettingsStore};
use tauri::{Emitter, Manager, State};

pub(crate) struct AppState {
    pub(crate) camera: CameraController,
    pub(crate) history: HistoryStore,
    pub(crate) diseases: RwLock<Option<HttpDiseaseService>>,
    pub(crate) settings: SettingsStore,
}

fn build_disease_service(settings: &ServiceSettings) -> Option<HttpDiseaseService> {
    let url = settings.resolve_base_url()?;
    match HttpDiseaseService::new(&url, Duration::from_secs(settings.timeout_secs)) {
        Ok(service) => Some(service),
        Err(err) => {
            log::error!("failed to build disease service client for {url}: {err}");
            None
        }
    }
}

#[tauri::command]
fn get_camera_settings(state: State<AppState>) -> Result<CameraConfig, String> {
    Ok(state.settings.camera())
}

#[tauri::command]
async fn set_camera_settings(
    config: CameraConfig,
    state: State<'_, AppState>,
    app_handle: tauri::AppHandle,
) -> Result<(), String> {
    state
        .settings
        .update_camera(config)
        .map_err(|e| e.to_string())?;
    state.camera.set_config(config).await;

    app_handle
        .emit("camera-settings-updated", &config)
        .map_err(|e| e.to_string())?;

    Ok(())
}

#[tauri::command]
fn get_service_settings(state: State<AppState>) -> Result<ServiceSettings, String> {
    Ok(state.settings.service())
}

#[tauri::command]
fn set_service_settings(
    settings: ServiceSettings,
    state: State<AppState>,
    app_handle: tauri::AppHandle,
) -> Result<(), String> {
    state
        .settings
        .update_service(settings.clone())
        .map_err(|e| e.to_string())?;

    // Swap the client so the new URL/timeout apply to the next check.
    *state.diseases.write().unwrap() = build_disease_service(&settings);

    app_handle
        .emit("service-settings-updated", &settings)
        .map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("VetCheck starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let history = HistoryStore::open(app_data_dir.join("history.json"));
                let settings_store = SettingsStore::new(app_data_dir.join("settings.json"))?;

                let service_settings = settings_store.service();
                let diseases = build_disease_service(&service_settings);
                if diseases.is_none() {
                    warn!("no disease service configured; symptom checks will fail until one is set");
                }

                let camera =
                    CameraController::new(Arc::new(SystemCamera::new()), settings_store.camera());

                app.manage(AppState {
                    camera,
                    history,
                    diseases: RwLock::new(diseases),
                    settings: settings_store,
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            get_camera_state,
            start_camera,
            capture_photo,
            switch_camera,
            stop_camera,
            retry_camera,
            check_camera_permissions,
            check_symptoms,
            get_disease,
            add_disease,
            add_animal,
            get_animal,
            add_detection,
            get_detection_history,
            get_history_stats,
            clear_detection_history,
            get_camera_settings,
            set_camera_settings,
            get_service_settings,
            set_service_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
