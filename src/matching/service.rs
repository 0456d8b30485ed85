use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Animal, Disease, SymptomCheckResult};

#[derive(Debug, Error)]
pub enum MatchingError {
    /// No service URL has been configured yet.
    #[error("disease service is not configured")]
    NotConfigured,
    #[error("disease service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("disease service returned {status}: {message}")]
    Remote { status: u16, message: String },
}

/// Boundary to the remote disease-matching service. The matching algorithm
/// itself lives on the service; this side only issues atomic
/// request/response calls. Calls are safe to reissue after a failure; a
/// failed call never yields a partial result.
#[async_trait]
pub trait DiseaseService: Send + Sync {
    async fn check_symptoms(
        &self,
        species: &str,
        symptoms: &[String],
    ) -> Result<SymptomCheckResult, MatchingError>;

    async fn get_disease(&self, name: &str) -> Result<Disease, MatchingError>;

    async fn add_disease(&self, disease: Disease) -> Result<(), MatchingError>;

    async fn add_animal(&self, id: u64, animal: Animal) -> Result<(), MatchingError>;

    async fn get_animal(&self, id: u64) -> Result<Animal, MatchingError>;
}
