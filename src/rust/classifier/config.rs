use std::fs;
use std::path::Path;
use serde_json::{Map, Value};

use super::error::ClassifierError;

pub const MODEL_PATH_KEY: &str = "modelPath";

/// Construction input for a classifier: a JSON object.
///
/// Only `modelPath` is interpreted here. Every other key is kept as given so
/// backends and callers can read their own settings from the same mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifierConfig {
    entries: Map<String, Value>,
}

impl ClassifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ClassifierError> {
        match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(entries)) => Ok(Self { entries }),
            Ok(other) => Err(ClassifierError::ConfigError(format!(
                "Expected a JSON object, got {}",
                other
            ))),
            Err(e) => Err(ClassifierError::ConfigError(format!("Invalid JSON: {}", e))),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    pub fn with_model_path(mut self, model_path: impl Into<String>) -> Self {
        self.entries.insert(MODEL_PATH_KEY.to_string(), Value::String(model_path.into()));
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// The required `modelPath` entry.
    pub fn model_path(&self) -> Result<&str, ClassifierError> {
        match self.entries.get(MODEL_PATH_KEY) {
            Some(Value::String(path)) => Ok(path.as_str()),
            Some(other) => Err(ClassifierError::ConfigError(format!(
                "'{}' must be a string, got {}",
                MODEL_PATH_KEY, other
            ))),
            None => Err(ClassifierError::ConfigError(format!(
                "Missing required key '{}'",
                MODEL_PATH_KEY
            ))),
        }
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }
}
