//! Trained artifacts: classifiers, scalers, label encoders, feature lists.
//!
//! Everything is read-only after load. The [`ArtifactCache`] owns one
//! lazily-initialized handle per registered name and hands out clones of
//! the same `Arc` for the lifetime of the process.

pub mod cache;
pub mod model;
pub mod preprocessors;
pub mod registry;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub use cache::ArtifactCache;
pub use model::{InputTensor, ModelError, ModelLoader, OnnxLoader, ScoringModel};
pub use preprocessors::{ClassLabel, EncoderSet, LabelEncoder, StandardScaler};
pub use registry::{ArtifactKind, ArtifactSpec};

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Unknown artifact: {0}")]
    Unknown(String),

    #[error("Missing artifact file for {name}: {path}")]
    Missing { name: String, path: PathBuf },

    #[error("Artifact {name} is corrupt: {detail}")]
    Corrupt { name: String, detail: String },

    #[error("Artifact {name} cannot be loaded: {detail}")]
    Unsupported { name: String, detail: String },

    #[error("Artifact {name} is a {actual}, expected a {expected}")]
    WrongKind {
        name: String,
        expected: ArtifactKind,
        actual: ArtifactKind,
    },

    #[error("Artifact cache lock poisoned")]
    LockPoisoned,
}

impl ArtifactError {
    /// Name of the artifact the error concerns, if any.
    pub fn artifact_name(&self) -> Option<&str> {
        match self {
            ArtifactError::Unknown(name) => Some(name),
            ArtifactError::Missing { name, .. }
            | ArtifactError::Corrupt { name, .. }
            | ArtifactError::Unsupported { name, .. }
            | ArtifactError::WrongKind { name, .. } => Some(name),
            ArtifactError::LockPoisoned => None,
        }
    }
}

/// A loaded artifact. Cloning is cheap; every payload is shared.
#[derive(Clone)]
pub enum Artifact {
    Model(Arc<dyn ScoringModel>),
    Scaler(Arc<StandardScaler>),
    Encoder(Arc<LabelEncoder>),
    EncoderSet(Arc<EncoderSet>),
    FeatureList(Arc<Vec<String>>),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Model(_) => ArtifactKind::Model,
            Artifact::Scaler(_) => ArtifactKind::Scaler,
            Artifact::Encoder(_) => ArtifactKind::Encoder,
            Artifact::EncoderSet(_) => ArtifactKind::EncoderSet,
            Artifact::FeatureList(_) => ArtifactKind::FeatureList,
        }
    }
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Artifact::{}", self.kind())
    }
}

/// Shared, immutable handle returned by the cache.
pub type ArtifactHandle = Arc<Artifact>;
