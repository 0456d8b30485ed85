pub(crate) mod commands;
mod http;
mod mock;
mod service;

pub use http::HttpDiseaseService;
pub use mock::MockDiseaseService;
pub use service::{DiseaseService, MatchingError};
