use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SymptomCheckResult;

/// Inline-encoded still image attached to a detection record.
/// Self-contained: carries everything needed to render or re-decode it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoPayload {
    pub mime_type: String,
    /// Base64 of the encoded image bytes.
    pub data: String,
    pub width: u32,
    pub height: u32,
}

impl PhotoPayload {
    pub fn from_jpeg(bytes: &[u8], width: u32, height: u32) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            data: BASE64.encode(bytes),
            width,
            height,
        }
    }

    /// Decoded image bytes, or `None` if the base64 payload is damaged.
    pub fn decode_bytes(&self) -> Option<Vec<u8>> {
        BASE64.decode(&self.data).ok()
    }

    /// Data URL form for direct rendering in the webview.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// One completed symptom-check session: the user's inputs, the optional
/// photo, and the service's result. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRecord {
    pub id: String,
    /// Milliseconds since epoch on the wire, matching records written by
    /// earlier versions of the app.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub species: String,
    pub breed: String,
    pub age: u32,
    /// User input order, duplicates allowed.
    pub symptoms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<PhotoPayload>,
    pub results: SymptomCheckResult,
}

impl DetectionRecord {
    /// Copy with the photo dropped. Used when persisting under storage
    /// pressure; the in-memory record keeps its photo.
    pub fn without_photo(&self) -> Self {
        Self {
            photo: None,
            ..self.clone()
        }
    }
}

/// Caller-supplied fields of a detection; id and timestamp are assigned by
/// the history store at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionDraft {
    pub species: String,
    pub breed: String,
    pub age: u32,
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub photo: Option<PhotoPayload>,
    pub results: SymptomCheckResult,
}
