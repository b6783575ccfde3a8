use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use log::info;

use super::backend::{ImageClassifier, Predictions, TrainingParams};
use super::config::ClassifierConfig;
use super::error::ClassifierError;
use crate::image_set::ImageSet;
use crate::model_manager::{resolve_model_path, ModelArtifact, ModelManager};

/// Labels in the order the pretrained weights emit them. Never reorder this
/// without retraining the model.
pub const ROOF_SHAPE_CLASSES: [&str; 3] = ["Flat", "Gable", "Hip"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoofShape {
    Flat,
    Gable,
    Hip,
}

impl RoofShape {
    pub const ALL: [RoofShape; 3] = [RoofShape::Flat, RoofShape::Gable, RoofShape::Hip];

    pub fn as_str(&self) -> &'static str {
        ROOF_SHAPE_CLASSES[self.index()]
    }

    /// Output index of this shape in the model
    pub fn index(&self) -> usize {
        match self {
            RoofShape::Flat => 0,
            RoofShape::Gable => 1,
            RoofShape::Hip => 2,
        }
    }

    /// Converts backend labels into shapes, failing on the first unknown label.
    pub fn from_predictions(predictions: &Predictions) -> Result<HashMap<String, RoofShape>, ClassifierError> {
        predictions
            .iter()
            .map(|(key, label)| {
                label
                    .parse::<RoofShape>()
                    .map(|shape| (key.clone(), shape))
                    .map_err(|_| {
                        ClassifierError::PredictionError(format!(
                            "Image '{}' has unknown roof shape '{}'",
                            key, label
                        ))
                    })
            })
            .collect()
    }
}

impl fmt::Display for RoofShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoofShape {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoofShape::ALL
            .into_iter()
            .find(|shape| shape.as_str() == s)
            .ok_or_else(|| ClassifierError::PredictionError(format!("Unknown roof shape: {}", s)))
    }
}

/// Classifies roofs as Flat, Gable or Hip.
///
/// The model file and label set are fixed at construction; prediction and
/// retraining are forwarded to the backend.
///
/// ```no_run
/// # use roofshape::{ImageClassifier, ImageSet, Predictions, RoofShapeClassifier, TrainingParams};
/// # use std::path::Path;
/// # struct Backend;
/// # impl ImageClassifier for Backend {
/// #     type Error = std::io::Error;
/// #     fn predict(&self, _: &ImageSet, _: &Path, _: &[&str]) -> Result<Predictions, Self::Error> { Ok(Predictions::new()) }
/// #     fn retrain(&self, _: &Path, _: &Path, _: &TrainingParams) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let classifier = RoofShapeClassifier::new(Backend, None).await?;
/// let images = ImageSet::from_dir("images/")?;
/// for (key, label) in classifier.predict(&images)? {
///     println!("{}: {}", key, label);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RoofShapeClassifier<C> {
    model_path: PathBuf,
    classes: [&'static str; 3],
    config: Option<ClassifierConfig>,
    backend: C,
}

impl<C: ImageClassifier> RoofShapeClassifier<C> {
    /// Creates a classifier, fetching the default weights into
    /// [`crate::DEFAULT_MODELS_DIR`] when `config` is `None`.
    ///
    /// A supplied config must carry `modelPath`.
    pub async fn new(backend: C, config: Option<ClassifierConfig>) -> Result<Self, ClassifierError> {
        match config {
            Some(config) => Self::from_config(backend, config),
            None => {
                let manager = ModelManager::new_default()?;
                Self::with_manager(backend, None, &manager, &ModelArtifact::roof_shape_v1()).await
            }
        }
    }

    /// Like [`RoofShapeClassifier::new`], resolving the default model through
    /// the given cache and artifact.
    pub async fn with_manager(
        backend: C,
        config: Option<ClassifierConfig>,
        manager: &ModelManager,
        artifact: &ModelArtifact,
    ) -> Result<Self, ClassifierError> {
        if let Some(config) = config {
            return Self::from_config(backend, config);
        }

        let model_path = resolve_model_path(None, manager, artifact).await?;
        info!("Default roof classifier model at {:?} loaded", model_path);
        Ok(Self::assemble(backend, None, model_path))
    }

    fn from_config(backend: C, config: ClassifierConfig) -> Result<Self, ClassifierError> {
        let model_path = PathBuf::from(config.model_path()?);
        info!("Inferences will be performed using the custom model at {:?}", model_path);
        Ok(Self::assemble(backend, Some(config), model_path))
    }

    fn assemble(backend: C, config: Option<ClassifierConfig>, model_path: PathBuf) -> Self {
        Self {
            model_path,
            classes: ROOF_SHAPE_CLASSES,
            config,
            backend,
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn classes(&self) -> &[&'static str] {
        &self.classes
    }

    /// The configuration this classifier was built from, if any
    pub fn config(&self) -> Option<&ClassifierConfig> {
        self.config.as_ref()
    }

    pub fn backend(&self) -> &C {
        &self.backend
    }

    /// Predicts a roof shape for every image, keyed like `images`.
    ///
    /// Backend failures are returned unchanged.
    pub fn predict(&self, images: &ImageSet) -> Result<Predictions, C::Error> {
        info!("Predicting roof shapes for {} images", images.len());
        self.backend.predict(images, &self.model_path, &self.classes)
    }

    /// Retrains the current model on the labelled images under `data_dir`.
    ///
    /// `model_path` keeps pointing at the original weights afterwards; build
    /// a new classifier from the backend's output to use retrained weights.
    pub fn retrain(&self, data_dir: impl AsRef<Path>, params: &TrainingParams) -> Result<(), C::Error> {
        let data_dir = data_dir.as_ref();
        info!(
            "Retraining {:?} on {:?} (batch size {}, {} epochs)",
            self.model_path, data_dir, params.batch_size, params.epochs
        );
        self.backend.retrain(&self.model_path, data_dir, params)
    }
}
