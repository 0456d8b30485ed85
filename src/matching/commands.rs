use tauri::State;

use crate::{
    models::{Animal, Disease, SymptomCheckResult},
    AppState,
};

use super::{DiseaseService, HttpDiseaseService, MatchingError};

/// Clone the configured client out of state so no lock is held across the
/// network await.
fn service(state: &State<'_, AppState>) -> Result<HttpDiseaseService, String> {
    state
        .diseases
        .read()
        .unwrap()
        .clone()
        .ok_or_else(|| MatchingError::NotConfigured.to_string())
}

#[tauri::command]
pub async fn check_symptoms(
    state: State<'_, AppState>,
    species: String,
    symptoms: Vec<String>,
) -> Result<SymptomCheckResult, String> {
    let service = service(&state)?;
    service
        .check_symptoms(&species, &symptoms)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_disease(state: State<'_, AppState>, name: String) -> Result<Disease, String> {
    let service = service(&state)?;
    service.get_disease(&name).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn add_disease(state: State<'_, AppState>, disease: Disease) -> Result<(), String> {
    let service = service(&state)?;
    service.add_disease(disease).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn add_animal(
    state: State<'_, AppState>,
    id: u64,
    animal: Animal,
) -> Result<(), String> {
    let service = service(&state)?;
    service
        .add_animal(id, animal)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_animal(state: State<'_, AppState>, id: u64) -> Result<Animal, String> {
    let service = service(&state)?;
    service.get_animal(id).await.map_err(|e| e.to_string())
}
