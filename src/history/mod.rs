pub(crate) mod commands;
mod stats;
mod store;

pub use stats::{DiseaseCount, HistoryStats, SpeciesCount};
pub use store::HistoryStore;
