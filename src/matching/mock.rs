//! In-process mock of the disease service for tests.
//! Not wired into the app; the real matching lives on the remote service.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::{Animal, Disease, SymptomCheckResult};

use super::service::{DiseaseService, MatchingError};

/// Deterministic [`DiseaseService`] backed by a canned catalog.
pub struct MockDiseaseService {
    catalog: Mutex<Vec<Disease>>,
    animals: Mutex<Vec<(u64, Animal)>>,
}

impl MockDiseaseService {
    pub fn new(catalog: Vec<Disease>) -> Self {
        Self {
            catalog: Mutex::new(catalog),
            animals: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MockDiseaseService {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl DiseaseService for MockDiseaseService {
    async fn check_symptoms(
        &self,
        species: &str,
        symptoms: &[String],
    ) -> Result<SymptomCheckResult, MatchingError> {
        let catalog = self.catalog.lock().unwrap();

        let potential_diseases: Vec<Disease> = catalog
            .iter()
            .filter(|disease| {
                disease.affected_species.iter().any(|s| s == species)
                    && disease.symptoms.iter().any(|s| symptoms.contains(s))
            })
            .cloned()
            .collect();

        let matched_symptoms: Vec<String> = symptoms
            .iter()
            .filter(|symptom| {
                potential_diseases
                    .iter()
                    .any(|disease| disease.symptoms.contains(symptom))
            })
            .cloned()
            .collect();

        Ok(SymptomCheckResult {
            potential_diseases,
            matched_symptoms,
        })
    }

    async fn get_disease(&self, name: &str) -> Result<Disease, MatchingError> {
        self.catalog
            .lock()
            .unwrap()
            .iter()
            .find(|disease| disease.name == name)
            .cloned()
            .ok_or_else(|| MatchingError::Remote {
                status: 404,
                message: format!("unknown disease '{name}'"),
            })
    }

    async fn add_disease(&self, disease: Disease) -> Result<(), MatchingError> {
        self.catalog.lock().unwrap().push(disease);
        Ok(())
    }

    async fn add_animal(&self, id: u64, animal: Animal) -> Result<(), MatchingError> {
        self.animals.lock().unwrap().push((id, animal));
        Ok(())
    }

    async fn get_animal(&self, id: u64) -> Result<Animal, MatchingError> {
        self.animals
            .lock()
            .unwrap()
            .iter()
            .find(|(animal_id, _)| *animal_id == id)
            .map(|(_, animal)| animal.clone())
            .ok_or_else(|| MatchingError::Remote {
                status: 404,
                message: format!("unknown animal {id}"),
            })
    }
}
