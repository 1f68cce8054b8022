/// Типы данных для ML модуля

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AqiError, Result};

pub const DATE_COLUMN: &str = "Date";
pub const TARGET_COLUMN: &str = "AQI";

/// Признаки в порядке стандартной схемы
pub const STANDARD_FEATURES: [&str; 10] = [
    "PM2.5",
    "PM10",
    "NO2",
    "SO2",
    "CO",
    "O3",
    "Temperature",
    "Humidity",
    "Wind Speed",
    "Wind Direction",
];

/// Упорядоченный набор колонок-признаков, на которых обучена модель
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_FEATURES)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.columns.join(", "))
    }
}

/// Одна строка исходного CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    pub aqi: Option<f64>,
    /// Значения признаков в порядке схемы датасета
    pub features: Vec<f64>,
}

/// Загруженный датасет. После создания не изменяется.
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: FeatureSchema,
    records: Vec<Record>,
    has_target: bool,
}

impl Dataset {
    /// Каждая запись обязана содержать ровно `schema.len()` признаков
    pub fn new(schema: FeatureSchema, records: Vec<Record>, has_target: bool) -> Result<Self> {
        if let Some((row, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| r.features.len() != schema.len())
        {
            return Err(AqiError::RecordWidth {
                row,
                expected: schema.len(),
                found: record.features.len(),
            });
        }
        Ok(Self::from_parts(schema, records, has_target))
    }

    /// Без проверки ширины: записи уже согласованы со схемой
    pub(crate) fn from_parts(schema: FeatureSchema, records: Vec<Record>, has_target: bool) -> Self {
        Self {
            schema,
            records,
            has_target,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Была ли колонка AQI в исходном файле
    pub fn has_target(&self) -> bool {
        self.has_target
    }

    /// Только строки с известным AQI (пригодные для обучения)
    pub fn labeled(&self) -> Dataset {
        let records: Vec<Record> = self
            .records
            .iter()
            .filter(|r| r.aqi.is_some())
            .cloned()
            .collect();
        Dataset::from_parts(self.schema.clone(), records, self.has_target)
    }

    pub fn is_chronological(&self) -> bool {
        self.records.windows(2).all(|w| w[0].date < w[1].date)
    }
}

/// Предсказание для одной строки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Predicted AQI")]
    pub predicted: f64,
    #[serde(rename = "Actual AQI")]
    pub actual: Option<f64>,
    #[serde(rename = "Error")]
    pub error: Option<f64>,
    #[serde(rename = "Category")]
    pub category: AqiCategory,
}

impl PredictionResult {
    pub fn new(date: NaiveDate, predicted: f64, actual: Option<f64>) -> Self {
        Self {
            date,
            predicted,
            actual,
            error: actual.map(|a| (predicted - a).abs()),
            category: AqiCategory::from_aqi(predicted),
        }
    }
}

/// Диапазоны AQI по шкале US EPA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_aqi(aqi: f64) -> Self {
        match aqi {
            v if v <= 50.0 => Self::Good,
            v if v <= 100.0 => Self::Moderate,
            v if v <= 150.0 => Self::UnhealthyForSensitiveGroups,
            v if v <= 200.0 => Self::Unhealthy,
            v if v <= 300.0 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, aqi: Option<f64>) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            aqi,
            features: vec![0.0; 10],
        }
    }

    #[test]
    fn category_boundaries() {
        assert_eq!(AqiCategory::from_aqi(0.0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(50.0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(50.5), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_aqi(150.0), AqiCategory::UnhealthyForSensitiveGroups);
        assert_eq!(AqiCategory::from_aqi(200.0), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::from_aqi(300.0), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::from_aqi(420.0), AqiCategory::Hazardous);
    }

    #[test]
    fn prediction_error_is_absolute_difference() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let result = PredictionResult::new(date, 80.0, Some(95.5));
        assert_eq!(result.error, Some(15.5));
        assert_eq!(result.category, AqiCategory::Moderate);

        let future = PredictionResult::new(date, 80.0, None);
        assert_eq!(future.error, None);
    }

    #[test]
    fn labeled_drops_rows_without_aqi() {
        let dataset = Dataset::new(
            FeatureSchema::standard(),
            vec![record(1, Some(10.0)), record(2, None), record(3, Some(30.0))],
            true,
        )
        .unwrap();
        let labeled = dataset.labeled();
        assert_eq!(labeled.len(), 2);
        assert!(labeled.records().iter().all(|r| r.aqi.is_some()));
        assert!(dataset.is_chronological());
    }

    #[test]
    fn chronology_detects_unordered_dates() {
        let dataset = Dataset::new(
            FeatureSchema::standard(),
            vec![record(2, None), record(1, None)],
            false,
        )
        .unwrap();
        assert!(!dataset.is_chronological());
    }

    #[test]
    fn records_must_match_schema_width() {
        let mut wide = record(2, None);
        wide.features.push(1.0);
        let err = Dataset::new(FeatureSchema::standard(), vec![record(1, None), wide], false)
            .unwrap_err();
        assert!(matches!(
            err,
            AqiError::RecordWidth {
                row: 1,
                expected: 10,
                found: 11
            }
        ));
    }
}
