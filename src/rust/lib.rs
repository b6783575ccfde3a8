//! Roof shape classification on top of a pluggable image classifier.
//!
//! [`RoofShapeClassifier`] fixes the label set (`Flat`, `Gable`, `Hip`) and the
//! weights file, and forwards `predict`/`retrain` to any [`ImageClassifier`].
//! When no weights are configured, the pretrained model is downloaded once into
//! `tmp/models/` and reused from there on.
//!
//! # Basic Usage
//!
//! ```no_run
//! # use std::path::Path;
//! use roofshape::{ClassifierConfig, ImageClassifier, ImageSet, Predictions, RoofShapeClassifier, TrainingParams};
//!
//! struct MyBackend;
//!
//! impl ImageClassifier for MyBackend {
//!     type Error = std::io::Error;
//!
//!     fn predict(&self, images: &ImageSet, _model: &Path, classes: &[&str]) -> Result<Predictions, Self::Error> {
//!         Ok(images.keys().map(|k| (k.to_string(), classes[0].to_string())).collect())
//!     }
//!
//!     fn retrain(&self, _model: &Path, _data: &Path, _params: &TrainingParams) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClassifierConfig::new().with_model_path("models/roof.pth");
//! let classifier = RoofShapeClassifier::new(MyBackend, Some(config)).await?;
//!
//! let mut images = ImageSet::with_dir("images");
//! images.add_image("house-1", "house-1.png");
//! let predictions = classifier.predict(&images)?;
//! println!("{:?}", predictions);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod image_set;
pub mod model_manager;

pub use classifier::{
    ClassifierConfig, ClassifierError, ImageClassifier, Predictions, RoofShape,
    RoofShapeClassifier, TrainingParams, MODEL_PATH_KEY, ROOF_SHAPE_CLASSES,
};
pub use image_set::{Image, ImageSet};
pub use model_manager::{resolve_model_path, ModelArtifact, ModelError, ModelManager, DEFAULT_MODELS_DIR};

pub fn init_logger() {
    env_logger::init();
}
