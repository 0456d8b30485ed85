use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::DetectionRecord;

/// How many entries each leaderboard keeps.
const TOP_N: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_detections: u64,
    pub common_species: Vec<SpeciesCount>,
    pub common_diseases: Vec<DiseaseCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesCount {
    pub species: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseCount {
    pub disease: String,
    pub count: u64,
}

/// Derive aggregate stats from the full collection. Pure; recomputed on
/// every call since local histories stay small.
pub fn derive(records: &[DetectionRecord]) -> HistoryStats {
    let mut species = CountTable::default();
    let mut diseases = CountTable::default();

    for record in records {
        species.bump(&record.species);
        for disease in &record.results.potential_diseases {
            diseases.bump(&disease.name);
        }
    }

    HistoryStats {
        total_detections: records.len() as u64,
        common_species: species
            .top(TOP_N)
            .into_iter()
            .map(|(species, count)| SpeciesCount { species, count })
            .collect(),
        common_diseases: diseases
            .top(TOP_N)
            .into_iter()
            .map(|(disease, count)| DiseaseCount { disease, count })
            .collect(),
    }
}

/// Frequency table that remembers first-encounter order so that ties rank
/// in iteration order rather than hash order.
#[derive(Default)]
struct CountTable {
    order: Vec<String>,
    counts: HashMap<String, u64>,
}

impl CountTable {
    fn bump(&mut self, key: &str) {
        if !self.counts.contains_key(key) {
            self.order.push(key.to_string());
        }
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
    }

    fn top(self, n: usize) -> Vec<(String, u64)> {
        let counts = self.counts;
        let mut ranked: Vec<(String, u64)> = self
            .order
            .into_iter()
            .map(|key| {
                let count = counts[&key];
                (key, count)
            })
            .collect();
        // Stable sort keeps first-encounter order among equal counts.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}
