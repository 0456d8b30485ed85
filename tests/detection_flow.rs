//! End-to-end flow over the in-process pieces: symptom check against a
//! mock service, photo compression, history persistence, and stats.

use std::io::Cursor;

use tempfile::TempDir;

use vetcheck_lib::history::HistoryStore;
use vetcheck_lib::matching::{DiseaseService, MockDiseaseService};
use vetcheck_lib::models::{DetectionDraft, Disease, PhotoPayload, SymptomCheckResult};
use vetcheck_lib::photo::{compress_to_budget, MAX_PHOTO_BYTES};

fn catalog() -> Vec<Disease> {
    vec![
        Disease {
            name: "Kennel Cough".to_string(),
            symptoms: vec!["coughing".to_string(), "sneezing".to_string()],
            affected_species: vec!["dog".to_string()],
            severity: "mild".to_string(),
            treatment_advice: "Rest, fluids, and isolation from other dogs.".to_string(),
        },
        Disease {
            name: "Canine Parvovirus".to_string(),
            symptoms: vec!["vomiting".to_string(), "lethargy".to_string()],
            affected_species: vec!["dog".to_string()],
            severity: "critical".to_string(),
            treatment_advice: "Veterinary emergency; supportive care.".to_string(),
        },
    ]
}

fn large_photo_png() -> Vec<u8> {
    // High-entropy fill so the source comfortably exceeds the byte budget.
    let mut state: u32 = 0x1234_5678;
    let img = image::ImageBuffer::from_fn(2000, 1400, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        image::Rgb([
            (state & 0xFF) as u8,
            ((state >> 8) & 0xFF) as u8,
            ((state >> 16) & 0xFF) as u8,
        ])
    });
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

fn draft(species: &str, photo: Option<PhotoPayload>, results: SymptomCheckResult) -> DetectionDraft {
    DetectionDraft {
        species: species.to_string(),
        breed: "beagle".to_string(),
        age: 4,
        symptoms: vec!["coughing".to_string(), "vomiting".to_string()],
        photo,
        results,
    }
}

#[tokio::test]
async fn full_detection_flow_persists_record_and_stats() {
    let service = MockDiseaseService::new(catalog());
    let results = service
        .check_symptoms("dog", &["coughing".to_string(), "vomiting".to_string()])
        .await
        .unwrap();

    // Both catalog entries match one reported symptom each.
    assert_eq!(results.potential_diseases.len(), 2);
    assert_eq!(results.matched_symptoms.len(), 2);

    // Compress the oversized photo down to the storage budget before it
    // goes into the record.
    let source = large_photo_png();
    assert!(source.len() > MAX_PHOTO_BYTES);
    let compressed = compress_to_budget(&source, MAX_PHOTO_BYTES).unwrap();
    assert!(compressed.jpeg.len() <= MAX_PHOTO_BYTES || compressed.quality == 10);
    assert!(compressed.width <= 800 && compressed.height <= 800);
    let payload = compressed.into_payload();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");
    let store = HistoryStore::open(path.clone());

    let record = store.add_detection(draft("dog", Some(payload), results.clone()));
    assert!(record.photo.is_some());

    let stats = store.stats();
    assert_eq!(stats.total_detections, 1);
    assert_eq!(stats.common_species[0].species, "dog");
    assert_eq!(stats.common_diseases.len(), 2);

    // The record survives a process restart, photo included.
    let reopened = HistoryStore::open(path);
    let records = reopened.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, record.id);
    assert!(records[0].photo.is_some());
    assert_eq!(records[0].results.potential_diseases.len(), 2);
}

#[tokio::test]
async fn photoless_submission_adds_exactly_one_record() {
    let service = MockDiseaseService::new(catalog());
    let results = service
        .check_symptoms("dog", &["coughing".to_string()])
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    let store = HistoryStore::open(dir.path().join("history.json"));
    let before = store.stats().total_detections;

    let record = store.add_detection(draft("dog", None, results));
    assert!(record.photo.is_none());

    let stats = store.stats();
    assert_eq!(stats.total_detections, before + 1);
    assert_eq!(store.records()[0].id, record.id);
}

#[tokio::test]
async fn service_order_of_candidates_is_preserved() {
    let service = MockDiseaseService::new(catalog());
    let results = service
        .check_symptoms("dog", &["coughing".to_string(), "vomiting".to_string()])
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    let store = HistoryStore::open(dir.path().join("history.json"));
    let record = store.add_detection(draft("dog", None, results.clone()));

    // Stored candidates keep the order the service returned them in.
    let stored: Vec<&str> = record
        .results
        .potential_diseases
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    let returned: Vec<&str> = results
        .potential_diseases
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(stored, returned);
}
