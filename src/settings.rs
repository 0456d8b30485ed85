use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::camera::CameraConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSettings {
    /// Base URL of the remote disease service; symptom checks fail with a
    /// configuration error until one is set.
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
        }
    }
}

impl ServiceSettings {
    /// Configured URL, with the `VETCHECK_SERVICE_URL` env var taking
    /// precedence when set.
    pub fn resolve_base_url(&self) -> Option<String> {
        std::env::var("VETCHECK_SERVICE_URL")
            .ok()
            .filter(|value| !value.is_empty())
            .or_else(|| self.base_url.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UserSettings {
    #[serde(default)]
    camera: CameraConfig,
    #[serde(default)]
    service: ServiceSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn camera(&self) -> CameraConfig {
        self.data.read().unwrap().camera
    }

    pub fn service(&self) -> ServiceSettings {
        self.data.read().unwrap().service.clone()
    }

    pub fn update_camera(&self, camera: CameraConfig) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.camera = camera;
        self.persist(&guard)
    }

    pub fn update_service(&self, service: ServiceSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.service = service;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_apply_when_no_file_exists() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();

        let camera = store.camera();
        assert_eq!((camera.width, camera.height), (1280, 720));
        assert_eq!(camera.quality, 85);
        assert!(store.service().base_url.is_none());
        assert_eq!(store.service().timeout_secs, 30);
    }

    #[test]
    fn updates_survive_a_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        {
            let store = SettingsStore::new(path.clone()).unwrap();
            store
                .update_service(ServiceSettings {
                    base_url: Some("http://localhost:9000".to_string()),
                    timeout_secs: 5,
                })
                .unwrap();
        }

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(
            store.service().base_url.as_deref(),
            Some("http://localhost:9000")
        );
        assert_eq!(store.service().timeout_secs, 5);
    }

    #[test]
    fn corrupt_settings_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json at all").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.camera().quality, 85);
    }
}
