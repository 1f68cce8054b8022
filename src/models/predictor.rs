//! Предсказание AQI обученной моделью

use std::path::Path;

use super::model::AqiModel;
use crate::error::Result;
use crate::preprocessing::{feature_matrix, DatasetLoader};
use crate::types::{Dataset, PredictionResult};

pub struct Predictor {
    model: AqiModel,
}

impl Predictor {
    pub fn new(model: AqiModel) -> Self {
        Self { model }
    }

    pub fn load(path: &Path) -> Result<Self> {
        AqiModel::load(path).map(Self::new)
    }

    pub fn model(&self) -> &AqiModel {
        &self.model
    }

    /// CSV читается по схеме модели; колонка AQI необязательна
    pub fn load_dataset(&self, path: &Path) -> Result<Dataset> {
        DatasetLoader::for_model(self.model.schema.clone()).load(path)
    }

    /// Один проход по датасету. Ошибка считается только там, где известен AQI.
    pub fn predict(&self, dataset: &Dataset) -> Result<Vec<PredictionResult>> {
        let features = feature_matrix(dataset);
        let predicted = self.model.predict(&features)?;

        let results: Vec<PredictionResult> = dataset
            .records()
            .iter()
            .zip(predicted.iter())
            .map(|(record, &value)| PredictionResult::new(record.date, value, record.aqi))
            .collect();

        tracing::info!(
            "Predicted {} rows ({} with actual AQI)",
            results.len(),
            results.iter().filter(|r| r.actual.is_some()).count()
        );
        Ok(results)
    }
}
