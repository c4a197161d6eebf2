//! Memoizing artifact cache.
//!
//! Each registered name gets its own slot. The first caller for a name
//! holds the slot lock while loading, so concurrent first access loads the
//! file once and nobody observes a half-built handle. Failed loads leave
//! the slot empty; the next request retries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::model::{ModelLoader, OnnxLoader, ScoringModel};
use super::preprocessors::{EncoderSet, LabelEncoder, StandardScaler};
use super::registry::{self, ArtifactKind, ArtifactSpec, REGISTRY};
use super::{Artifact, ArtifactError, ArtifactHandle};

type Slot = Arc<Mutex<Option<ArtifactHandle>>>;

pub struct ArtifactCache {
    dir: PathBuf,
    loader: Arc<dyn ModelLoader>,
    slots: Mutex<HashMap<&'static str, Slot>>,
}

impl ArtifactCache {
    /// Cache over `dir`, loading models through ONNX Runtime.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_loader(dir, Arc::new(OnnxLoader))
    }

    pub fn with_loader(dir: impl Into<PathBuf>, loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            dir: dir.into(),
            loader,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Return the handle for `name`, loading it on first use.
    pub fn get(&self, name: &str) -> Result<ArtifactHandle, ArtifactError> {
        let spec =
            registry::lookup(name).ok_or_else(|| ArtifactError::Unknown(name.to_string()))?;

        let slot = {
            let mut slots = self.slots.lock().map_err(|_| ArtifactError::LockPoisoned)?;
            Arc::clone(slots.entry(spec.name).or_default())
        };

        let mut guard = slot.lock().map_err(|_| ArtifactError::LockPoisoned)?;
        if let Some(handle) = guard.as_ref() {
            return Ok(Arc::clone(handle));
        }

        let handle = Arc::new(self.load(spec)?);
        *guard = Some(Arc::clone(&handle));
        Ok(handle)
    }

    pub fn model(&self, name: &str) -> Result<Arc<dyn ScoringModel>, ArtifactError> {
        match &*self.get(name)? {
            Artifact::Model(model) => Ok(Arc::clone(model)),
            other => Err(wrong_kind(name, ArtifactKind::Model, other)),
        }
    }

    pub fn scaler(&self, name: &str) -> Result<Arc<StandardScaler>, ArtifactError> {
        match &*self.get(name)? {
            Artifact::Scaler(scaler) => Ok(Arc::clone(scaler)),
            other => Err(wrong_kind(name, ArtifactKind::Scaler, other)),
        }
    }

    pub fn encoder(&self, name: &str) -> Result<Arc<LabelEncoder>, ArtifactError> {
        match &*self.get(name)? {
            Artifact::Encoder(encoder) => Ok(Arc::clone(encoder)),
            other => Err(wrong_kind(name, ArtifactKind::Encoder, other)),
        }
    }

    pub fn encoder_set(&self, name: &str) -> Result<Arc<EncoderSet>, ArtifactError> {
        match &*self.get(name)? {
            Artifact::EncoderSet(set) => Ok(Arc::clone(set)),
            other => Err(wrong_kind(name, ArtifactKind::EncoderSet, other)),
        }
    }

    pub fn feature_list(&self, name: &str) -> Result<Arc<Vec<String>>, ArtifactError> {
        match &*self.get(name)? {
            Artifact::FeatureList(features) => Ok(Arc::clone(features)),
            other => Err(wrong_kind(name, ArtifactKind::FeatureList, other)),
        }
    }

    /// Names currently held in the cache, sorted. Slots still loading are
    /// not reported.
    pub fn loaded(&self) -> Vec<&'static str> {
        let Ok(slots) = self.slots.lock() else {
            return Vec::new();
        };
        let mut names: Vec<&'static str> = slots
            .iter()
            .filter(|(_, slot)| slot.try_lock().map(|s| s.is_some()).unwrap_or(false))
            .map(|(name, _)| *name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Try to load every registered artifact, logging what is unavailable.
    ///
    /// Never fails: endpoints whose artifacts are missing answer 503 until
    /// the files appear.
    pub fn warm_up(&self) -> Vec<(&'static str, ArtifactError)> {
        let mut failures = Vec::new();
        for spec in REGISTRY {
            if let Err(e) = self.get(spec.name) {
                tracing::warn!(artifact = spec.name, error = %e, "Artifact unavailable at startup");
                failures.push((spec.name, e));
            }
        }
        tracing::info!(
            loaded = REGISTRY.len() - failures.len(),
            unavailable = failures.len(),
            dir = %self.dir.display(),
            "Artifact warm-up finished"
        );
        failures
    }

    fn load(&self, spec: &ArtifactSpec) -> Result<Artifact, ArtifactError> {
        let path = self.dir.join(spec.file);
        if !path.is_file() {
            tracing::error!(artifact = spec.name, path = %path.display(), "Missing artifact file");
            return Err(ArtifactError::Missing {
                name: spec.name.to_string(),
                path,
            });
        }

        let artifact = match spec.kind {
            ArtifactKind::Model => Artifact::Model(self.loader.load(spec.name, &path)?),
            ArtifactKind::Scaler => {
                let scaler: StandardScaler = read_json(spec, &path)?;
                scaler.validate().map_err(|detail| corrupt(spec, detail))?;
                Artifact::Scaler(Arc::new(scaler))
            }
            ArtifactKind::Encoder => {
                let encoder: LabelEncoder = read_json(spec, &path)?;
                encoder.validate().map_err(|detail| corrupt(spec, detail))?;
                Artifact::Encoder(Arc::new(encoder))
            }
            ArtifactKind::EncoderSet => {
                let set: EncoderSet = read_json(spec, &path)?;
                for (key, encoder) in &set {
                    encoder
                        .validate()
                        .map_err(|detail| corrupt(spec, format!("{key}: {detail}")))?;
                }
                Artifact::EncoderSet(Arc::new(set))
            }
            ArtifactKind::FeatureList => {
                let features: Vec<String> = read_json(spec, &path)?;
                if features.is_empty() {
                    return Err(corrupt(spec, "feature list is empty".into()));
                }
                Artifact::FeatureList(Arc::new(features))
            }
        };

        tracing::info!(artifact = spec.name, kind = %spec.kind, "Loaded artifact");
        Ok(artifact)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(
    spec: &ArtifactSpec,
    path: &Path,
) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|e| corrupt(spec, format!("read failed: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| corrupt(spec, format!("invalid JSON: {e}")))
}

fn corrupt(spec: &ArtifactSpec, detail: String) -> ArtifactError {
    tracing::error!(artifact = spec.name, %detail, "Artifact could not be deserialized");
    ArtifactError::Corrupt {
        name: spec.name.to_string(),
        detail,
    }
}

fn wrong_kind(name: &str, expected: ArtifactKind, actual: &Artifact) -> ArtifactError {
    ArtifactError::WrongKind {
        name: name.to_string(),
        expected,
        actual: actual.kind(),
    }
}
