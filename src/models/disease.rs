use serde::{Deserialize, Serialize};

/// Catalog entry owned by the remote disease service. Read-only on this side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disease {
    pub name: String,
    pub symptoms: Vec<String>,
    pub affected_species: Vec<String>,
    /// Free-text classification as reported by the service, e.g. "severe".
    /// Use [`Disease::severity_bucket`] for display grouping.
    pub severity: String,
    pub treatment_advice: String,
}

impl Disease {
    pub fn severity_bucket(&self) -> SeverityBucket {
        SeverityBucket::from_label(&self.severity)
    }
}

/// Local display bucket for the service's free-text severity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeverityBucket {
    Critical,
    Moderate,
    Mild,
}

impl SeverityBucket {
    /// Substring heuristic: "critical"/"severe" outrank "moderate",
    /// anything else is treated as mild.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.to_lowercase();
        if normalized.contains("critical") || normalized.contains("severe") {
            SeverityBucket::Critical
        } else if normalized.contains("moderate") {
            SeverityBucket::Moderate
        } else {
            SeverityBucket::Mild
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityBucket::Critical => "Critical",
            SeverityBucket::Moderate => "Moderate",
            SeverityBucket::Mild => "Mild",
        }
    }
}

/// Response of the remote symptom check. `potential_diseases` keeps the
/// service's relevance ordering; it is never re-sorted locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomCheckResult {
    pub potential_diseases: Vec<Disease>,
    pub matched_symptoms: Vec<String>,
}

/// Animal registration entity on the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub species: String,
    pub breed: String,
    pub age: u32,
    pub symptoms: Vec<String>,
}
