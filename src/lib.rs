//! AQI ML - обучение нейросети и предсказание индекса качества воздуха

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod synthetic;
pub mod types;

pub use config::TrainingConfig;
pub use error::{AqiError, Result, SchemaError};
pub use metrics::ErrorSummary;
pub use models::*;
pub use preprocessing::*;
pub use types::*;
