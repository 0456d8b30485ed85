use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::models::{Animal, Disease, SymptomCheckResult};

use super::service::{DiseaseService, MatchingError};

/// How much of an error body is kept for the user-facing message.
const ERROR_BODY_LIMIT: usize = 512;

/// HTTP client for the remote disease service.
///
/// One request per operation, JSON both ways, no client-side retries: a
/// failure is surfaced whole and the user decides whether to resubmit.
#[derive(Clone)]
pub struct HttpDiseaseService {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckSymptomsRequest<'a> {
    species: &'a str,
    symptoms: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddAnimalRequest {
    id: u64,
    #[serde(flatten)]
    animal: Animal,
}

impl HttpDiseaseService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MatchingError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, MatchingError> {
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn check_status(response: Response) -> Result<Response, MatchingError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let mut message = response.text().await.unwrap_or_default();
        message.truncate(ERROR_BODY_LIMIT);
        Err(MatchingError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl DiseaseService for HttpDiseaseService {
    async fn check_symptoms(
        &self,
        species: &str,
        symptoms: &[String],
    ) -> Result<SymptomCheckResult, MatchingError> {
        debug!(
            "checking {} symptom(s) for species '{species}' against {}",
            symptoms.len(),
            self.base_url
        );

        let response = self
            .client
            .post(self.endpoint("api/symptoms/check"))
            .json(&CheckSymptomsRequest { species, symptoms })
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn get_disease(&self, name: &str) -> Result<Disease, MatchingError> {
        let response = self
            .client
            .get(self.endpoint("api/diseases"))
            .query(&[("name", name)])
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn add_disease(&self, disease: Disease) -> Result<(), MatchingError> {
        let response = self
            .client
            .post(self.endpoint("api/diseases"))
            .json(&disease)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn add_animal(&self, id: u64, animal: Animal) -> Result<(), MatchingError> {
        let response = self
            .client
            .post(self.endpoint("api/animals"))
            .json(&AddAnimalRequest { id, animal })
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn get_animal(&self, id: u64) -> Result<Animal, MatchingError> {
        let response = self
            .client
            .get(self.endpoint("api/animals"))
            .query(&[("id", id)])
            .send()
            .await?;
        Self::parse(response).await
    }
}
