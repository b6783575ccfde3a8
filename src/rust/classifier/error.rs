use std::fmt;
use std::io;

use crate::model_manager::ModelError;

/// Errors raised while setting up a classifier.
///
/// Failures inside a backend's `predict` or `retrain` are not wrapped here;
/// they reach the caller as the backend's own error type.
#[derive(Debug)]
pub enum ClassifierError {
    /// A configuration key is missing or has the wrong type
    ConfigError(String),
    /// The default model could not be fetched or cached
    ModelError(ModelError),
    /// A configuration file could not be read
    IoError(io::Error),
    /// A backend returned a label outside the roof shape classes
    PredictionError(String),
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Self::ModelError(err) => write!(f, "Model error: {}", err),
            Self::IoError(err) => write!(f, "IO error: {}", err),
            Self::PredictionError(msg) => write!(f, "Prediction error: {}", msg),
        }
    }
}

impl std::error::Error for ClassifierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigError(_) | Self::PredictionError(_) => None,
            Self::ModelError(err) => Some(err),
            Self::IoError(err) => Some(err),
        }
    }
}

impl From<ModelError> for ClassifierError {
    fn from(err: ModelError) -> Self {
        ClassifierError::ModelError(err)
    }
}

impl From<io::Error> for ClassifierError {
    fn from(err: io::Error) -> Self {
        ClassifierError::IoError(err)
    }
}
