use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AqiError, Result};

/// Loss по эпохам (MSE в единицах AQI²)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epochs: Vec<usize>,
    pub train_loss: Vec<f64>,
    /// Пусто, если обучение шло без валидационной выборки
    pub validation_loss: Vec<f64>,
}

impl TrainingHistory {
    pub fn record(&mut self, epoch: usize, train_loss: f64, validation_loss: Option<f64>) {
        self.epochs.push(epoch);
        self.train_loss.push(train_loss);
        if let Some(loss) = validation_loss {
            self.validation_loss.push(loss);
        }
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn final_train_loss(&self) -> Option<f64> {
        self.train_loss.last().copied()
    }

    pub fn final_validation_loss(&self) -> Option<f64> {
        self.validation_loss.last().copied()
    }

    /// (эпоха, loss) с минимальной валидационной ошибкой
    pub fn best_validation(&self) -> Option<(usize, f64)> {
        self.epochs
            .iter()
            .zip(&self.validation_loss)
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(&epoch, &loss)| (epoch, loss))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| AqiError::io(path, e))
    }
}
