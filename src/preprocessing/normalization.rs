//! Нормализация данных

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{AqiError, Result};

/// Z-score нормализация признаков. Статистики считаются только по обучающей выборке.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataNormalizer {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl DataNormalizer {
    pub fn fit(X: &Array2<f64>) -> Result<Self> {
        // mean_axis возвращает None только для пустой оси
        let mean = X.mean_axis(Axis(0)).ok_or(AqiError::InsufficientData {
            rows: 0,
            required: 1,
        })?;
        let mut std = X.std_axis(Axis(0), 0.0);

        // Избегаем деления на ноль
        for val in std.iter_mut() {
            if *val < 1e-10 {
                *val = 1.0;
            }
        }

        Ok(Self { mean, std })
    }

    pub fn transform(&self, X: &Array2<f64>) -> Array2<f64> {
        debug_assert_eq!(X.ncols(), self.mean.len());
        (X - &self.mean) / &self.std
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }
}

/// Масштабирование целевой переменной (AQI) к нулевому среднему и единичной дисперсии
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetScaler {
    pub mean: f64,
    pub std: f64,
}

impl TargetScaler {
    pub fn fit(y: &Array1<f64>) -> Result<Self> {
        let mean = y.mean().ok_or(AqiError::InsufficientData {
            rows: 0,
            required: 1,
        })?;
        let std = y.std(0.0);
        Ok(Self {
            mean,
            std: if std < 1e-10 { 1.0 } else { std },
        })
    }

    pub fn transform(&self, y: &Array1<f64>) -> Array1<f64> {
        y.mapv(|v| (v - self.mean) / self.std)
    }

    pub fn inverse(&self, y: &Array1<f64>) -> Array1<f64> {
        y.mapv(|v| v * self.std + self.mean)
    }

    /// Перевод MSE из масштабированных единиц в единицы AQI²
    pub fn unscale_mse(&self, mse: f64) -> f64 {
        mse * self.std * self.std
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn transformed_columns_are_standardized() {
        let X = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let normalizer = DataNormalizer::fit(&X).unwrap();
        let scaled = normalizer.transform(&X);

        let means = scaled.mean_axis(Axis(0)).unwrap();
        assert!(means.iter().all(|m| m.abs() < 1e-12));
        let stds = scaled.std_axis(Axis(0), 0.0);
        assert!(stds.iter().all(|s| (s - 1.0).abs() < 1e-12));
    }

    #[test]
    fn constant_column_is_left_centered() {
        let X = array![[5.0, 1.0], [5.0, 2.0]];
        let normalizer = DataNormalizer::fit(&X).unwrap();
        assert_eq!(normalizer.std()[0], 1.0);
        assert_eq!(normalizer.transform(&X).column(0).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let X = Array2::<f64>::zeros((0, 3));
        assert!(DataNormalizer::fit(&X).is_err());
    }

    #[test]
    fn target_scaler_inverts() {
        let y = array![50.0, 100.0, 150.0];
        let scaler = TargetScaler::fit(&y).unwrap();
        let restored = scaler.inverse(&scaler.transform(&y));
        for (a, b) in restored.iter().zip(y.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
        assert!((scaler.unscale_mse(1.0) - scaler.std * scaler.std).abs() < 1e-12);
    }
}
