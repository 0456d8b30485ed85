use log::warn;
use tauri::State;

use crate::{
    models::{DetectionDraft, DetectionRecord, PhotoPayload},
    photo,
    AppState,
};

use super::HistoryStats;

#[tauri::command]
pub async fn add_detection(
    state: State<'_, AppState>,
    draft: DetectionDraft,
) -> Result<DetectionRecord, String> {
    let mut draft = draft;
    if let Some(payload) = draft.photo.take() {
        draft.photo = prepare_photo(payload).await;
    }
    Ok(state.history.add_detection(draft))
}

#[tauri::command]
pub fn get_detection_history(state: State<'_, AppState>) -> Result<Vec<DetectionRecord>, String> {
    Ok(state.history.records())
}

#[tauri::command]
pub fn get_history_stats(state: State<'_, AppState>) -> Result<HistoryStats, String> {
    Ok(state.history.stats())
}

#[tauri::command]
pub fn clear_detection_history(state: State<'_, AppState>) -> Result<(), String> {
    state.history.clear();
    Ok(())
}

/// Shrink an oversized photo before it reaches the store. A payload that
/// cannot be decoded is dropped so the record goes in without it.
async fn prepare_photo(payload: PhotoPayload) -> Option<PhotoPayload> {
    let decoded_len = match payload.decode_bytes() {
        Some(bytes) => bytes.len(),
        None => {
            warn!("dropping photo: payload is not valid base64");
            return None;
        }
    };

    if decoded_len <= photo::MAX_PHOTO_BYTES {
        return Some(payload);
    }

    match photo::compress_payload(&payload, photo::MAX_PHOTO_BYTES).await {
        Ok(compressed) => Some(compressed),
        Err(err) => {
            warn!("dropping photo: compression failed: {err}");
            None
        }
    }
}
