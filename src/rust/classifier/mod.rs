mod backend;
mod config;
mod error;
mod roof_shape;

pub use backend::{ImageClassifier, Predictions, TrainingParams};
pub use config::{ClassifierConfig, MODEL_PATH_KEY};
pub use error::ClassifierError;
pub use roof_shape::{RoofShape, RoofShapeClassifier, ROOF_SHAPE_CLASSES};
