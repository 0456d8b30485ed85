use tauri::{AppHandle, Emitter, State};

use crate::{models::PhotoPayload, AppState};

use super::{CameraSnapshot, FacingMode};

/// Every transition is mirrored to the webview so the capture dialog can
/// re-render without polling.
async fn emit_state(app_handle: &AppHandle, state: &State<'_, AppState>) {
    let snapshot = state.camera.snapshot().await;
    let _ = app_handle.emit("camera-state-changed", snapshot);
}

#[tauri::command]
pub async fn get_camera_state(state: State<'_, AppState>) -> Result<CameraSnapshot, String> {
    Ok(state.camera.snapshot().await)
}

#[tauri::command]
pub async fn start_camera(
    state: State<'_, AppState>,
    app_handle: AppHandle,
    facing_mode: Option<FacingMode>,
) -> Result<CameraSnapshot, String> {
    let result = state.camera.start(facing_mode).await;
    emit_state(&app_handle, &state).await;
    result.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn capture_photo(state: State<'_, AppState>) -> Result<Option<PhotoPayload>, String> {
    state.camera.capture().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn switch_camera(
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<CameraSnapshot, String> {
    let result = state.camera.switch().await;
    emit_state(&app_handle, &state).await;
    result.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn stop_camera(
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<(), String> {
    state.camera.stop().await;
    emit_state(&app_handle, &state).await;
    Ok(())
}

#[tauri::command]
pub async fn retry_camera(
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<CameraSnapshot, String> {
    let result = state.camera.retry().await;
    emit_state(&app_handle, &state).await;
    result.map_err(|e| e.to_string())
}

#[tauri::command]
pub fn check_camera_permissions() -> Result<bool, String> {
    #[cfg(target_os = "macos")]
    {
        Ok(super::avfoundation::permission_granted())
    }

    #[cfg(not(target_os = "macos"))]
    {
        // Capture is unavailable off-macOS; the UI hides the camera button
        // based on `is_supported` instead of the permission state.
        Ok(true)
    }
}
