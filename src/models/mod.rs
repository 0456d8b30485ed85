mod detection;
mod disease;

pub use detection::{DetectionDraft, DetectionRecord, PhotoPayload};
pub use disease::{Animal, Disease, SeverityBucket, SymptomCheckResult};
