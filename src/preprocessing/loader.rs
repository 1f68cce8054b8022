//! Загрузка датасета из CSV

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{AqiError, Result, SchemaError};
use crate::types::{Dataset, FeatureSchema, Record, DATE_COLUMN, TARGET_COLUMN};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];
const MISSING_MARKERS: [&str; 4] = ["", "NA", "NaN", "null"];

/// Читает CSV фиксированной схемы: Date, AQI и колонки признаков.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    schema: FeatureSchema,
    require_target: bool,
    strict: bool,
    /// Нехватка признака означает чужую модель, а не битый файл
    model_schema: bool,
}

/// Позиции нужных колонок в заголовке
struct ColumnIndex {
    date: usize,
    target: Option<usize>,
    features: Vec<usize>,
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self::with_schema(FeatureSchema::standard())
    }

    pub fn with_schema(schema: FeatureSchema) -> Self {
        Self {
            schema,
            require_target: true,
            strict: false,
            model_schema: false,
        }
    }

    /// Данные для обученной модели: AQI необязателен, отсутствие
    /// признака модели дает SchemaMismatch
    pub fn for_model(schema: FeatureSchema) -> Self {
        Self {
            schema,
            require_target: false,
            strict: false,
            model_schema: true,
        }
    }

    /// Для предсказаний: колонка AQI может отсутствовать
    pub fn target_optional(mut self) -> Self {
        self.require_target = false;
        self
    }

    /// Лишние колонки становятся ошибкой вместо предупреждения
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn load(&self, path: &Path) -> Result<Dataset> {
        let file = File::open(path).map_err(|e| AqiError::io(path, e))?;
        let dataset = self.read_from(file)?;
        tracing::info!("Loaded {} rows from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<Dataset> {
        let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let index = self.resolve_columns(&headers)?;

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            records.push(self.parse_row(&row, &index, line)?);
        }

        let dataset = Dataset::from_parts(self.schema.clone(), records, index.target.is_some());
        if !dataset.is_chronological() {
            tracing::debug!("Dataset dates are not strictly increasing");
        }
        Ok(dataset)
    }

    fn resolve_columns(&self, headers: &StringRecord) -> Result<ColumnIndex> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (i, name) in headers.iter().enumerate() {
            if positions.insert(name, i).is_some() {
                return Err(SchemaError::DuplicateColumn(name.to_string()).into());
            }
        }

        let find = |column: &str| {
            positions
                .get(column)
                .copied()
                .ok_or_else(|| SchemaError::MissingColumn(column.to_string()))
        };

        let date = find(DATE_COLUMN)?;
        let target = match find(TARGET_COLUMN) {
            Ok(i) => Some(i),
            Err(e) if self.require_target => return Err(e.into()),
            Err(_) => None,
        };
        let features = match self
            .schema
            .columns()
            .iter()
            .map(|c| find(c.as_str()))
            .collect::<std::result::Result<Vec<_>, _>>()
        {
            Ok(features) => features,
            Err(_) if self.model_schema => {
                return Err(AqiError::SchemaMismatch {
                    expected: self.schema.columns().to_vec(),
                    found: headers
                        .iter()
                        .filter(|name| *name != DATE_COLUMN && *name != TARGET_COLUMN)
                        .map(str::to_string)
                        .collect(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        for name in headers.iter() {
            let known = name == DATE_COLUMN || name == TARGET_COLUMN || self.schema.contains(name);
            if known {
                continue;
            }
            if self.strict {
                return Err(SchemaError::UnexpectedColumn(name.to_string()).into());
            }
            tracing::warn!("Ignoring unknown column '{}'", name);
        }

        Ok(ColumnIndex {
            date,
            target,
            features,
        })
    }

    fn parse_row(&self, row: &StringRecord, index: &ColumnIndex, line: u64) -> Result<Record> {
        let field = |i: usize| row.get(i).unwrap_or("");

        let date = parse_date(field(index.date)).ok_or_else(|| AqiError::Parse {
            line,
            column: DATE_COLUMN.to_string(),
            value: field(index.date).to_string(),
            expected: "a date",
        })?;

        let aqi = match index.target {
            Some(i) => parse_optional(field(i)).ok_or_else(|| AqiError::Parse {
                line,
                column: TARGET_COLUMN.to_string(),
                value: field(i).to_string(),
                expected: "a number or an empty value",
            })?,
            None => None,
        };

        let mut features = Vec::with_capacity(index.features.len());
        for (column, &i) in self.schema.columns().iter().zip(&index.features) {
            let raw = field(i);
            let value = parse_number(raw).ok_or_else(|| AqiError::Parse {
                line,
                column: column.clone(),
                value: raw.to_string(),
                expected: "a number",
            })?;
            features.push(value);
        }

        Ok(Record {
            date,
            aqi,
            features,
        })
    }
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `Some(None)` для пустого значения, `None` если значение не читается
fn parse_optional(raw: &str) -> Option<Option<f64>> {
    if MISSING_MARKERS.iter().any(|m| raw.eq_ignore_ascii_case(m)) {
        return Some(None);
    }
    parse_number(raw).map(Some)
}
