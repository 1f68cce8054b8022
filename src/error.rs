//! Ошибки библиотеки

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AqiError>;

/// Проблемы со структурой CSV
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("required column '{0}' is missing")]
    MissingColumn(String),
    #[error("column '{0}' appears more than once in the header")]
    DuplicateColumn(String),
    #[error("unexpected column '{0}'")]
    UnexpectedColumn(String),
    #[error("dataset has no AQI column")]
    MissingTargetColumn,
}

#[derive(Debug, Error)]
pub enum AqiError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("parse error at line {line}, column '{column}': cannot read '{value}' as {expected}")]
    Parse {
        line: u64,
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("feature schema mismatch: model expects [{}], dataset has [{}]", .expected.join(", "), .found.join(", "))]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("insufficient data: {rows} usable rows, at least {required} required")]
    InsufficientData { rows: usize, required: usize },

    #[error("row {row} has {found} feature values, schema has {expected}")]
    RecordWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row} ({date}) has no AQI value")]
    MissingTarget { row: usize, date: String },

    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),

    #[error("training diverged at epoch {epoch}: loss is {loss}")]
    TrainingDiverged { epoch: usize, loss: f64 },

    #[error("model format version {found} is not supported (expected {expected})")]
    UnsupportedModelVersion { found: u32, expected: u32 },

    #[error("cannot access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl AqiError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
