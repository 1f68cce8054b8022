/// CLI для обучения и предсказания AQI

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use aqi_ml::{
    report, split_features_and_target, AqiModel, DatasetLoader, ErrorSummary, ModelTrainer,
    Predictor, TrainingConfig,
};

#[derive(Parser)]
#[command(name = "aqi-ml")]
#[command(about = "Train a neural network on historical air-quality data and predict AQI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from a historical CSV dataset
    Train(TrainArgs),

    /// Predict AQI for a CSV dataset with a trained model
    Predict {
        /// Trained model file
        #[arg(long)]
        model: PathBuf,

        /// CSV with Date and the feature columns (AQI optional)
        #[arg(long)]
        data: PathBuf,

        /// Export results to CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display model information
    Info {
        #[arg(long)]
        model: PathBuf,
    },
}

#[derive(Args)]
struct TrainArgs {
    /// CSV with Date, AQI and the ten feature columns
    #[arg(long)]
    dataset: PathBuf,

    /// Output model file
    #[arg(short, long, default_value = "aqi_model.json")]
    model: PathBuf,

    /// JSON file with training options
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    epochs: Option<usize>,

    #[arg(long)]
    learning_rate: Option<f64>,

    /// Fraction of rows held out for validation
    #[arg(long)]
    validation_split: Option<f64>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Write per-epoch losses to this JSON file
    #[arg(long)]
    history: Option<PathBuf>,
}

fn main() {
    // Инициализация логирования; stdout остается под отчеты
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Train(args) => cmd_train(args),
        Commands::Predict {
            model,
            data,
            output,
        } => cmd_predict(&model, &data, output.as_deref()),
        Commands::Info { model } => cmd_info(&model),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn training_config(args: &TrainArgs) -> Result<TrainingConfig> {
    let mut config = match &args.config {
        Some(path) => TrainingConfig::from_file(path)
            .with_context(|| format!("failed to read training config {}", path.display()))?,
        None => TrainingConfig::default(),
    };

    if let Some(epochs) = args.epochs {
        config.epochs = epochs;
    }
    if let Some(lr) = args.learning_rate {
        config.learning_rate = lr;
    }
    if let Some(split) = args.validation_split {
        config.validation_split = split;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn cmd_train(args: TrainArgs) -> Result<()> {
    let config = training_config(&args)?;
    let trainer = ModelTrainer::new(config)?;

    let dataset = DatasetLoader::with_schema(trainer.config().schema())
        .load(&args.dataset)
        .with_context(|| format!("failed to load dataset {}", args.dataset.display()))?;
    let labeled = dataset.labeled();
    if labeled.len() < dataset.len() {
        tracing::info!("Skipping {} rows without AQI", dataset.len() - labeled.len());
    }

    let (features, target) = split_features_and_target(&labeled)?;
    let outcome = trainer
        .train_and_save(&features, &target, &args.model)
        .with_context(|| format!("training failed for {}", args.dataset.display()))?;

    if let Some(path) = &args.history {
        outcome
            .history
            .save(path)
            .with_context(|| format!("failed to write history {}", path.display()))?;
    }

    let metadata = &outcome.model.metadata;
    println!("Model written to {}", args.model.display());
    println!("Final training loss (MSE): {:.4}", metadata.final_train_loss);
    if let Some(val) = metadata.final_validation_loss {
        println!("Final validation loss (MSE): {:.4}", val);
    }
    for warning in &outcome.warnings {
        println!("Warning: {warning}");
    }
    Ok(())
}

fn cmd_predict(model_path: &Path, data: &Path, output: Option<&Path>) -> Result<()> {
    let predictor = Predictor::load(model_path)
        .with_context(|| format!("failed to load model {}", model_path.display()))?;

    let dataset = predictor
        .load_dataset(data)
        .with_context(|| format!("failed to load data {}", data.display()))?;

    let results = predictor.predict(&dataset)?;

    print!("{}", report::render_table(&results));
    println!();
    println!("{}", report::render_summary(ErrorSummary::from_results(&results).as_ref()));

    if let Some(path) = output {
        report::write_csv(&results, path)
            .with_context(|| format!("failed to write results {}", path.display()))?;
    }
    Ok(())
}

fn cmd_info(model_path: &Path) -> Result<()> {
    let model = AqiModel::load(model_path)
        .with_context(|| format!("failed to load model {}", model_path.display()))?;
    let meta = &model.metadata;

    println!("Model: {}", model_path.display());
    println!("Format version: {}", model.format_version);
    println!("Trained at: {}", meta.trained_at.to_rfc3339());
    println!("Features: {}", model.schema);
    println!(
        "Architecture: {:?} ({} parameters)",
        model.network.architecture(),
        model.network.parameter_count()
    );
    println!(
        "Training: {} epochs, learning rate {}, batch size {}, seed {}",
        meta.epochs_run, model.config.learning_rate, model.config.batch_size, model.config.seed
    );
    println!(
        "Rows: {} training, {} validation",
        meta.training_rows, meta.validation_rows
    );
    println!("Final training loss (MSE): {:.4}", meta.final_train_loss);
    if let Some(val) = meta.final_validation_loss {
        println!("Final validation loss (MSE): {:.4}", val);
    }
    Ok(())
}
