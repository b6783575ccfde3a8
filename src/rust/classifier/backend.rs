use std::collections::HashMap;
use std::path::Path;

use crate::image_set::ImageSet;

/// Predicted label for every image key that was classified.
pub type Predictions = HashMap<String, String>;

/// Hyperparameters forwarded to [`ImageClassifier::retrain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingParams {
    pub batch_size: usize,
    pub epochs: usize,
    /// Ask the backend to produce a loss curve alongside the weights
    pub plot_loss: bool,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            batch_size: 8,
            epochs: 100,
            plot_loss: true,
        }
    }
}

impl TrainingParams {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_plot_loss(mut self, plot_loss: bool) -> Self {
        self.plot_loss = plot_loss;
        self
    }
}

/// A generic image classifier that loads weights from a file.
///
/// Implementations own preprocessing and the network itself. Callers only
/// choose the weights file and the label set, whose order must match the
/// indices the weights were trained to emit.
pub trait ImageClassifier {
    type Error;

    /// Classifies every image in `images`, keyed like the input set.
    fn predict(
        &self,
        images: &ImageSet,
        model_path: &Path,
        classes: &[&str],
    ) -> Result<Predictions, Self::Error>;

    /// Fine-tunes the weights at `model_path` on the labelled images under `data_dir`.
    fn retrain(
        &self,
        model_path: &Path,
        data_dir: &Path,
        params: &TrainingParams,
    ) -> Result<(), Self::Error>;
}

impl<T: ImageClassifier + ?Sized> ImageClassifier for &T {
    type Error = T::Error;

    fn predict(&self, images: &ImageSet, model_path: &Path, classes: &[&str]) -> Result<Predictions, Self::Error> {
        (**self).predict(images, model_path, classes)
    }

    fn retrain(&self, model_path: &Path, data_dir: &Path, params: &TrainingParams) -> Result<(), Self::Error> {
        (**self).retrain(model_path, data_dir, params)
    }
}
