use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use super::ArtifactError;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Input shape {shape:?} does not match {len} values")]
    Shape { shape: Vec<usize>, len: usize },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model produced no float output")]
    EmptyOutput,
}

/// Dense `f32` input with an explicit shape (row-major).
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl InputTensor {
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, ModelError> {
        if shape.iter().product::<usize>() != data.len() {
            return Err(ModelError::Shape {
                shape,
                len: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// A single feature row: shape `[1, n]`.
    pub fn row(features: Vec<f32>) -> Self {
        Self {
            shape: vec![1, features.len()],
            data: features,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// A trained classifier. Returns the raw score vector for a batch of one.
pub trait ScoringModel: Send + Sync {
    fn score(&self, input: &InputTensor) -> Result<Vec<f32>, ModelError>;
}

/// Turns a model file into a [`ScoringModel`]. Injected into the cache so
/// tests can stand in for ONNX Runtime.
pub trait ModelLoader: Send + Sync {
    fn load(&self, name: &str, path: &Path) -> Result<Arc<dyn ScoringModel>, ArtifactError>;
}

// ═══════════════════════════════════════════════════════════
// ONNX Runtime backend — behind `onnx` feature
// ═══════════════════════════════════════════════════════════

#[cfg(feature = "onnx")]
mod onnx {
    use super::{InputTensor, ModelError, ScoringModel};
    use crate::artifacts::ArtifactError;
    use ort::session::Session;
    use std::path::Path;
    use std::sync::Mutex;

    /// Classifier exported to ONNX (Keras via tf2onnx, XGBoost via onnxmltools).
    ///
    /// `Session::run` needs `&mut self`, hence the Mutex.
    pub struct OnnxModel {
        session: Mutex<Session>,
    }

    impl OnnxModel {
        pub fn load(name: &str, path: &Path) -> Result<Self, ArtifactError> {
            let corrupt = |detail: String| ArtifactError::Corrupt {
                name: name.to_string(),
                detail,
            };

            let session = Session::builder()
                .map_err(|e: ort::Error| corrupt(e.to_string()))?
                .with_intra_threads(2)
                .map_err(|e: ort::Error| corrupt(e.to_string()))?
                .commit_from_file(path)
                .map_err(|e: ort::Error| corrupt(format!("ONNX load failed: {e}")))?;

            tracing::info!(artifact = name, path = %path.display(), "ONNX model loaded");

            Ok(Self {
                session: Mutex::new(session),
            })
        }
    }

    impl ScoringModel for OnnxModel {
        fn score(&self, input: &InputTensor) -> Result<Vec<f32>, ModelError> {
            use ort::value::TensorRef;

            let array = ndarray::ArrayD::from_shape_vec(
                ndarray::IxDyn(input.shape()),
                input.data().to_vec(),
            )
            .map_err(|e| ModelError::Inference(e.to_string()))?;
            let tensor = TensorRef::from_array_view(&array)
                .map_err(|e| ModelError::Inference(e.to_string()))?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| ModelError::Inference("Session lock poisoned".to_string()))?;

            let outputs = session
                .run(ort::inputs![tensor])
                .map_err(|e| ModelError::Inference(format!("ONNX inference failed: {e}")))?;

            // Converted tree classifiers emit an int64 label tensor first and
            // the probabilities second; take the first float output.
            for index in 0..outputs.len() {
                if let Ok((_shape, data)) = outputs[index].try_extract_tensor::<f32>() {
                    return Ok(data.to_vec());
                }
            }
            Err(ModelError::EmptyOutput)
        }
    }
}

/// Loads `.onnx` files through ONNX Runtime.
///
/// Without the `onnx` feature every load fails with
/// [`ArtifactError::Unsupported`], which surfaces as 503.
#[derive(Debug, Default, Clone, Copy)]
pub struct OnnxLoader;

impl ModelLoader for OnnxLoader {
    #[cfg(feature = "onnx")]
    fn load(&self, name: &str, path: &Path) -> Result<Arc<dyn ScoringModel>, ArtifactError> {
        Ok(Arc::new(onnx::OnnxModel::load(name, path)?))
    }

    #[cfg(not(feature = "onnx"))]
    fn load(&self, name: &str, path: &Path) -> Result<Arc<dyn ScoringModel>, ArtifactError> {
        tracing::warn!(
            artifact = name,
            path = %path.display(),
            "ONNX support not compiled in; rebuild with --features onnx"
        );
        Err(ArtifactError::Unsupported {
            name: name.to_string(),
            detail: "ONNX Runtime support is not enabled in this build".into(),
        })
    }
}
