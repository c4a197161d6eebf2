//! Shared fixtures: an artifacts directory with small fitted preprocessors
//! and a model loader that returns canned scores.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use crate::artifacts::registry::{ArtifactKind, REGISTRY};
use crate::artifacts::{
    ArtifactCache, ArtifactError, InputTensor, ModelError, ModelLoader, ScoringModel,
};

pub const TOP_FEATURES: &[&str] = &[
    "fever",
    "headache",
    "cough",
    "shortness_of_breath",
    "pain_chest",
    "asthenia",
    "chill",
    "sore_to_touch",
    "diarrhea",
    "vomiting",
];

pub const DISEASE_CLASSES: &[&str] = &["Common Cold", "Influenza", "Malaria", "Pneumonia", "Typhoid"];

/// Every model input seen, tagged with the artifact name.
pub type InputLog = Arc<Mutex<Vec<(String, InputTensor)>>>;

pub struct FixedScoreLoader {
    default: Vec<f32>,
    scores: HashMap<String, Vec<f32>>,
    loads: Arc<AtomicUsize>,
    inputs: InputLog,
}

impl FixedScoreLoader {
    pub fn new(score: f32) -> Self {
        Self {
            default: vec![score],
            scores: HashMap::new(),
            loads: Arc::new(AtomicUsize::new(0)),
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_scores(mut self, name: &str, scores: Vec<f32>) -> Self {
        self.scores.insert(name.to_string(), scores);
        self
    }

    pub fn load_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.loads)
    }

    pub fn input_log(&self) -> InputLog {
        Arc::clone(&self.inputs)
    }
}

impl ModelLoader for FixedScoreLoader {
    fn load(&self, name: &str, _path: &Path) -> Result<Arc<dyn ScoringModel>, ArtifactError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        // Widen the race window for the concurrent first-access test.
        std::thread::sleep(std::time::Duration::from_millis(10));
        Ok(Arc::new(RecordingModel {
            name: name.to_string(),
            scores: self.scores.get(name).cloned().unwrap_or_else(|| self.default.clone()),
            inputs: Arc::clone(&self.inputs),
        }))
    }
}

struct RecordingModel {
    name: String,
    scores: Vec<f32>,
    inputs: InputLog,
}

impl ScoringModel for RecordingModel {
    fn score(&self, input: &InputTensor) -> Result<Vec<f32>, ModelError> {
        if let Ok(mut log) = self.inputs.lock() {
            log.push((self.name.clone(), input.clone()));
        }
        Ok(self.scores.clone())
    }
}

/// Write a complete artifacts directory. Model files are placeholders;
/// the loader never reads them.
pub fn write_fixture_artifacts(dir: &Path) {
    let files: Vec<(&str, serde_json::Value)> = vec![
        ("top_features.json", serde_json::json!(TOP_FEATURES)),
        ("label_encoder.json", encoder(DISEASE_CLASSES)),
        (
            "diabetes_scaler.json",
            serde_json::json!({
                "feature_names": ["Age", "BMI", "SkinThickness"],
                "mean": [40.0, 25.0, 20.0],
                "scale": [10.0, 5.0, 10.0]
            }),
        ),
        ("diabetes_label_encoder.json", encoder(&["High", "Low", "Moderate"])),
        (
            "heart_disease_scaler.json",
            serde_json::json!({
                "feature_names": ["Age", "BloodPressure", "BMI"],
                "mean": [50.0, 120.0, 25.0],
                "scale": [10.0, 20.0, 5.0]
            }),
        ),
        (
            "heart_disease_label_encoder.json",
            serde_json::json!({ "classes": [1.0, 2.0, 3.0, 4.0] }),
        ),
        (
            "mental_health_scaler.json",
            serde_json::json!({ "feature_names": ["Age"], "mean": [30.0], "scale": [10.0] }),
        ),
        (
            "mental_health_label_encoders.json",
            serde_json::json!({
                "sleep": { "classes": ["Fair", "Good", "Poor"] },
                "mood": { "classes": ["Never", "Often", "Rarely", "Sometimes"] },
                "social": { "classes": ["High", "Low", "Moderate"] }
            }),
        ),
    ];

    for (file, value) in files {
        std::fs::write(dir.join(file), value.to_string()).unwrap();
    }
    for spec in REGISTRY.iter().filter(|s| s.kind == ArtifactKind::Model) {
        std::fs::write(dir.join(spec.file), b"placeholder").unwrap();
    }
}

fn encoder(classes: &[&str]) -> serde_json::Value {
    serde_json::json!({ "classes": classes })
}

/// A cache over a freshly written fixture directory. Keep the `TempDir`
/// alive for the duration of the test.
pub fn fixture_cache(loader: FixedScoreLoader) -> (ArtifactCache, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_artifacts(dir.path());
    (ArtifactCache::with_loader(dir.path(), Arc::new(loader)), dir)
}

/// In-memory sink for `tracing` output, for asserting on log lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// A TRACE-level fmt subscriber writing into this buffer. Install it
    /// with `tracing::subscriber::set_default`.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
