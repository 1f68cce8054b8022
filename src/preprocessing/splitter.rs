//! Разделение датасета на признаки и целевую переменную

use ndarray::{Array1, Array2};

use crate::error::{AqiError, Result, SchemaError};
use crate::types::{Dataset, FeatureSchema};

/// Матрица признаков: строка на запись, колонка на признак схемы
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub schema: FeatureSchema,
    pub values: Array2<f64>,
}

impl FeatureMatrix {
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }
}

/// Значения AQI, выровненные со строками матрицы признаков
#[derive(Debug, Clone, PartialEq)]
pub struct TargetVector {
    pub values: Array1<f64>,
}

impl TargetVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub fn feature_matrix(dataset: &Dataset) -> FeatureMatrix {
    let n_samples = dataset.len();
    let n_features = dataset.schema().len();

    let mut values = Array2::zeros((n_samples, n_features));
    for (i, record) in dataset.records().iter().enumerate() {
        for (j, value) in record.features.iter().enumerate() {
            values[[i, j]] = *value;
        }
    }

    FeatureMatrix {
        schema: dataset.schema().clone(),
        values,
    }
}

/// Для обучения: каждая строка должна иметь AQI (см. `Dataset::labeled`)
pub fn split_features_and_target(dataset: &Dataset) -> Result<(FeatureMatrix, TargetVector)> {
    if !dataset.has_target() {
        return Err(SchemaError::MissingTargetColumn.into());
    }

    let targets = dataset
        .records()
        .iter()
        .enumerate()
        .map(|(row, record)| {
            record.aqi.ok_or_else(|| AqiError::MissingTarget {
                row,
                date: record.date.to_string(),
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok((
        feature_matrix(dataset),
        TargetVector {
            values: Array1::from(targets),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use chrono::NaiveDate;

    fn dataset(aqis: &[Option<f64>], has_target: bool) -> Dataset {
        let records = aqis
            .iter()
            .enumerate()
            .map(|(i, aqi)| Record {
                date: NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap(),
                aqi: *aqi,
                features: (0..10).map(|j| (i * 10 + j) as f64).collect(),
            })
            .collect();
        Dataset::new(FeatureSchema::standard(), records, has_target).unwrap()
    }

    #[test]
    fn shapes_are_row_aligned() {
        let data = dataset(&[Some(10.0), Some(20.0), Some(30.0)], true);
        let (x, y) = split_features_and_target(&data).unwrap();

        assert_eq!(x.values.dim(), (3, 10));
        assert_eq!(y.len(), 3);
        assert_eq!(x.values[[2, 0]], 20.0);
        assert_eq!(x.values[[2, 9]], 29.0);
        assert_eq!(y.values[2], 30.0);
    }

    #[test]
    fn missing_target_column() {
        let data = dataset(&[None], false);
        assert!(matches!(
            split_features_and_target(&data),
            Err(AqiError::Schema(SchemaError::MissingTargetColumn))
        ));
        assert_eq!(feature_matrix(&data).nrows(), 1);
    }

    #[test]
    fn null_target_requires_labeled_view() {
        let data = dataset(&[Some(10.0), None], true);
        assert!(matches!(
            split_features_and_target(&data),
            Err(AqiError::MissingTarget { row: 1, .. })
        ));

        let (x, y) = split_features_and_target(&data.labeled()).unwrap();
        assert_eq!(x.nrows(), 1);
        assert_eq!(y.len(), 1);
    }
}
