//! Параметры обучения

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AqiError, Result};
use crate::types::{FeatureSchema, STANDARD_FEATURES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    /// Доля строк, отложенных для валидации, в диапазоне [0, 1)
    #[serde(default = "default_validation_split")]
    pub validation_split: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_hidden_layers")]
    pub hidden_layers: Vec<usize>,
    #[serde(default)]
    pub l2_penalty: f64,
    #[serde(default = "default_min_rows")]
    pub min_rows: usize,
    /// Минимальное относительное снижение loss между первой и последней эпохой
    #[serde(default = "default_convergence_tolerance")]
    pub convergence_tolerance: f64,
    #[serde(default = "default_features")]
    pub features: Vec<String>,
}

fn default_learning_rate() -> f64 { 0.01 }
fn default_epochs() -> usize { 200 }
fn default_validation_split() -> f64 { 0.2 }
fn default_seed() -> u64 { 42 }
fn default_batch_size() -> usize { 16 }
fn default_hidden_layers() -> Vec<usize> { vec![16, 8] }
fn default_min_rows() -> usize { 10 }
fn default_convergence_tolerance() -> f64 { 1e-4 }
fn default_features() -> Vec<String> {
    STANDARD_FEATURES.iter().map(|s| s.to_string()).collect()
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            epochs: default_epochs(),
            validation_split: default_validation_split(),
            seed: default_seed(),
            batch_size: default_batch_size(),
            hidden_layers: default_hidden_layers(),
            l2_penalty: 0.0,
            min_rows: default_min_rows(),
            convergence_tolerance: default_convergence_tolerance(),
            features: default_features(),
        }
    }
}

impl TrainingConfig {
    /// Чтение JSON-файла; отсутствующие поля получают значения по умолчанию
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| AqiError::io(path, e))?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn schema(&self) -> FeatureSchema {
        FeatureSchema::new(self.features.iter().cloned())
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(AqiError::InvalidConfig(msg));

        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return invalid(format!("learning_rate must be positive, got {}", self.learning_rate));
        }
        if self.epochs == 0 {
            return invalid("epochs must be at least 1".to_string());
        }
        if self.batch_size == 0 {
            return invalid("batch_size must be at least 1".to_string());
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            return invalid(format!(
                "validation_split must be in [0, 1), got {}",
                self.validation_split
            ));
        }
        if self.hidden_layers.iter().any(|&width| width == 0) {
            return invalid("hidden layer width must be at least 1".to_string());
        }
        if !(self.l2_penalty.is_finite() && self.l2_penalty >= 0.0) {
            return invalid(format!("l2_penalty must be non-negative, got {}", self.l2_penalty));
        }
        if self.features.is_empty() {
            return invalid("at least one feature column is required".to_string());
        }
        let mut seen = HashSet::new();
        for feature in &self.features {
            if !seen.insert(feature.as_str()) {
                return invalid(format!("feature '{feature}' is listed twice"));
            }
        }
        Ok(())
    }
}
