//! Синтетические данные с известной линейной зависимостью AQI от PM2.5

use std::io::Write;
use std::path::Path;

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{AqiError, Result};
use crate::types::{Dataset, FeatureSchema, Record, DATE_COLUMN, TARGET_COLUMN};

pub const AQI_PER_PM25: f64 = 2.0;
pub const AQI_INTERCEPT: f64 = 15.0;

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub rows: usize,
    pub seed: u64,
    pub start: NaiveDate,
    /// Амплитуда равномерного шума, добавляемого к AQI
    pub noise: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            rows: 100,
            seed: 42,
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN),
            noise: 0.0,
        }
    }
}

pub fn expected_aqi(pm25: f64) -> f64 {
    AQI_PER_PM25 * pm25 + AQI_INTERCEPT
}

/// Ежедневные записи: PM2.5 определяет AQI, остальные признаки случайны
pub fn generate(config: &SyntheticConfig) -> Dataset {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let records = (0..config.rows)
        .map(|day| {
            let pm25 = rng.gen_range(5.0..150.0);
            let features = vec![
                pm25,
                rng.gen_range(10.0..200.0),  // PM10
                rng.gen_range(5.0..80.0),    // NO2
                rng.gen_range(1.0..30.0),    // SO2
                rng.gen_range(0.1..3.0),     // CO
                rng.gen_range(10.0..120.0),  // O3
                rng.gen_range(-5.0..35.0),   // Temperature
                rng.gen_range(20.0..95.0),   // Humidity
                rng.gen_range(0.0..12.0),    // Wind Speed
                rng.gen_range(0.0..360.0),   // Wind Direction
            ];
            let noise = if config.noise > 0.0 {
                rng.gen_range(-config.noise..=config.noise)
            } else {
                0.0
            };

            Record {
                date: config.start + Days::new(day as u64),
                aqi: Some(expected_aqi(pm25) + noise),
                features,
            }
        })
        .collect();

    Dataset::from_parts(FeatureSchema::standard(), records, true)
}

fn write_records<W: Write>(dataset: &Dataset, wtr: &mut csv::Writer<W>) -> Result<()> {
    let mut header = vec![DATE_COLUMN.to_string()];
    if dataset.has_target() {
        header.push(TARGET_COLUMN.to_string());
    }
    header.extend(dataset.schema().columns().iter().cloned());
    wtr.write_record(&header)?;

    for record in dataset.records() {
        let mut row = vec![record.date.to_string()];
        if dataset.has_target() {
            row.push(record.aqi.map(|v| v.to_string()).unwrap_or_default());
        }
        row.extend(record.features.iter().map(|v| v.to_string()));
        wtr.write_record(&row)?;
    }
    Ok(())
}

pub fn write_dataset<W: Write>(dataset: &Dataset, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    write_records(dataset, &mut wtr)?;
    wtr.flush().map_err(|e| AqiError::Csv(e.into()))?;
    Ok(())
}

pub fn write_dataset_file(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| AqiError::io(path, e))?;
    let mut wtr = csv::Writer::from_writer(file);
    write_records(dataset, &mut wtr)?;
    wtr.flush().map_err(|e| AqiError::io(path, e))?;
    Ok(())
}
