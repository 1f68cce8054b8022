//! Обученная модель и ее хранение на диске

use std::path::Path;

use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::network::FeedForwardNetwork;
use crate::config::TrainingConfig;
use crate::error::{AqiError, Result};
use crate::preprocessing::{DataNormalizer, FeatureMatrix, TargetScaler};
use crate::types::FeatureSchema;

pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub trained_at: DateTime<Utc>,
    pub training_rows: usize,
    pub validation_rows: usize,
    pub epochs_run: usize,
    pub final_train_loss: f64,
    pub final_validation_loss: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AqiModel {
    pub format_version: u32,
    pub schema: FeatureSchema,
    pub network: FeedForwardNetwork,
    pub normalizer: DataNormalizer,
    pub target_scaler: TargetScaler,
    pub config: TrainingConfig,
    pub metadata: ModelMetadata,
}

impl AqiModel {
    pub fn ensure_schema(&self, schema: &FeatureSchema) -> Result<()> {
        if &self.schema != schema {
            return Err(AqiError::SchemaMismatch {
                expected: self.schema.columns().to_vec(),
                found: schema.columns().to_vec(),
            });
        }
        Ok(())
    }

    /// Предсказанный AQI для каждой строки матрицы
    pub fn predict(&self, features: &FeatureMatrix) -> Result<Array1<f64>> {
        self.ensure_schema(&features.schema)?;
        let scaled = self.normalizer.transform(&features.values);
        let output = self.network.predict(&scaled);
        Ok(self.target_scaler.inverse(&output))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| AqiError::io(path, e))?;
        tracing::info!("Model saved to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| AqiError::io(path, e))?;
        let model: Self = serde_json::from_str(&raw)?;
        if model.format_version != MODEL_FORMAT_VERSION {
            return Err(AqiError::UnsupportedModelVersion {
                found: model.format_version,
                expected: MODEL_FORMAT_VERSION,
            });
        }
        tracing::debug!(
            "Loaded model from {} ({} features, {} parameters)",
            path.display(),
            model.schema.len(),
            model.network.parameter_count()
        );
        Ok(model)
    }
}
