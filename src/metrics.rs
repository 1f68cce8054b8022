//! Метрики ошибки предсказаний

use serde::{Deserialize, Serialize};

use crate::types::PredictionResult;

/// Сводка по строкам, где известен фактический AQI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub count: usize,
    pub mae: f64,
    pub rmse: f64,
    pub max_error: f64,
}

impl ErrorSummary {
    /// `None`, если ни у одной строки нет фактического значения
    pub fn from_results(results: &[PredictionResult]) -> Option<Self> {
        let pairs: Vec<(f64, f64)> = results
            .iter()
            .filter_map(|r| r.actual.map(|a| (r.predicted, a)))
            .collect();
        if pairs.is_empty() {
            return None;
        }

        let (predicted, actual): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        Some(Self {
            count: predicted.len(),
            mae: mean_absolute_error(&predicted, &actual),
            rmse: root_mean_squared_error(&predicted, &actual),
            max_error: predicted
                .iter()
                .zip(&actual)
                .map(|(p, a)| (p - a).abs())
                .fold(0.0, f64::max),
        })
    }
}

pub fn mean_absolute_error(predicted: &[f64], actual: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).abs())
        .sum::<f64>()
        / actual.len() as f64
}

pub fn root_mean_squared_error(predicted: &[f64], actual: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mse = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).powi(2))
        .sum::<f64>()
        / actual.len() as f64;
    mse.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn mae_and_rmse() {
        let predicted = [10.0, 20.0, 30.0];
        let actual = [12.0, 18.0, 34.0];
        assert!((mean_absolute_error(&predicted, &actual) - 8.0 / 3.0).abs() < 1e-12);
        assert!((root_mean_squared_error(&predicted, &actual) - 8.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn summary_skips_rows_without_actual() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let results = vec![
            PredictionResult::new(date, 100.0, Some(90.0)),
            PredictionResult::new(date, 50.0, None),
            PredictionResult::new(date, 70.0, Some(74.0)),
        ];
        let summary = ErrorSummary::from_results(&results).unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.mae, 7.0);
        assert_eq!(summary.max_error, 10.0);

        assert_eq!(ErrorSummary::from_results(&results[1..2]), None);
    }
}
