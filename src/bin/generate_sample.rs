//! Пишет синтетический датасет AQI с известной зависимостью от PM2.5

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use aqi_ml::synthetic::{self, SyntheticConfig};

#[derive(Parser)]
#[command(name = "generate_sample")]
#[command(about = "Write a synthetic air-quality CSV where AQI depends linearly on PM2.5")]
#[command(version)]
struct Cli {
    /// Output CSV file
    #[arg(default_value = "sample_aqi.csv")]
    path: PathBuf,

    /// Number of daily rows
    #[arg(short, long, default_value_t = 100)]
    rows: usize,

    /// Random seed for reproducibility
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Amplitude of uniform noise added to AQI
    #[arg(long, default_value_t = 5.0)]
    noise: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SyntheticConfig {
        rows: cli.rows,
        seed: cli.seed,
        noise: cli.noise,
        ..Default::default()
    };

    let dataset = synthetic::generate(&config);
    synthetic::write_dataset_file(&dataset, &cli.path)
        .with_context(|| format!("failed to write {}", cli.path.display()))?;

    println!(
        "Wrote {} rows to {} (AQI = {} * PM2.5 + {} ± {})",
        dataset.len(),
        cli.path.display(),
        synthetic::AQI_PER_PM25,
        synthetic::AQI_INTERCEPT,
        config.noise
    );
    Ok(())
}
