//! Обучение модели AQI

#![allow(non_snake_case)]

use std::fmt;
use std::path::Path;

use chrono::Utc;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::history::TrainingHistory;
use super::model::{AqiModel, ModelMetadata, MODEL_FORMAT_VERSION};
use super::network::{mean_squared_error, FeedForwardNetwork};
use super::optimizer::Adam;
use crate::config::TrainingConfig;
use crate::error::{AqiError, Result};
use crate::preprocessing::{DataNormalizer, FeatureMatrix, TargetScaler, TargetVector};

/// Во сколько раз итоговая валидационная ошибка может превысить лучшую
const OVERFIT_RATIO: f64 = 1.5;

/// Нефатальные проблемы сходимости: пишутся в лог, обучение не прерывают
#[derive(Debug, Clone, PartialEq)]
pub enum ConvergenceWarning {
    LossNotDecreasing { first: f64, last: f64 },
    ValidationLossIncreasing { best_epoch: usize, best: f64, last: f64 },
}

impl fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LossNotDecreasing { first, last } => write!(
                f,
                "training loss did not decrease (first epoch {first:.4}, last epoch {last:.4})"
            ),
            Self::ValidationLossIncreasing { best_epoch, best, last } => write!(
                f,
                "validation loss rose from {best:.4} at epoch {best_epoch} to {last:.4}; the model may be overfitting"
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: AqiModel,
    pub history: TrainingHistory,
    pub warnings: Vec<ConvergenceWarning>,
}

/// Обучающая и валидационная выборки после перемешивания
struct Split {
    X_train: Array2<f64>,
    y_train: Array1<f64>,
    X_val: Array2<f64>,
    y_val: Array1<f64>,
}

pub struct ModelTrainer {
    config: TrainingConfig,
}

impl ModelTrainer {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn fit(&self, features: &FeatureMatrix, target: &TargetVector) -> Result<TrainingOutcome> {
        let config = &self.config;
        let expected = config.schema();
        if features.schema != expected {
            return Err(AqiError::SchemaMismatch {
                expected: expected.columns().to_vec(),
                found: features.schema.columns().to_vec(),
            });
        }
        debug_assert_eq!(features.nrows(), target.len());

        let n_samples = features.nrows();
        if n_samples < config.min_rows {
            return Err(AqiError::InsufficientData {
                rows: n_samples,
                required: config.min_rows,
            });
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let split = self.split(features, target, &mut rng)?;

        // Нормализация по обучающей выборке
        let normalizer = DataNormalizer::fit(&split.X_train)?;
        let target_scaler = TargetScaler::fit(&split.y_train)?;
        let X_train = normalizer.transform(&split.X_train);
        let y_train = target_scaler.transform(&split.y_train);
        let X_val = normalizer.transform(&split.X_val);
        let y_val = target_scaler.transform(&split.y_val);
        let has_validation = !y_val.is_empty();

        let mut network = FeedForwardNetwork::new(features.ncols(), &config.hidden_layers, &mut rng);
        let mut optimizer = Adam::new(&network, config.learning_rate);
        let mut history = TrainingHistory::default();
        let mut order: Vec<usize> = (0..X_train.nrows()).collect();
        let log_every = (config.epochs / 10).max(1);

        tracing::info!(
            "Training on {} rows ({} validation), architecture {:?}, {} epochs",
            X_train.nrows(),
            X_val.nrows(),
            network.architecture(),
            config.epochs
        );

        for epoch in 1..=config.epochs {
            order.shuffle(&mut rng);
            for batch in order.chunks(config.batch_size) {
                let X_batch = X_train.select(Axis(0), batch);
                let y_batch = y_train.select(Axis(0), batch);
                let cache = network.forward(&X_batch);
                let gradients = network.backward(&cache, &y_batch, config.l2_penalty);
                optimizer.step(&mut network, &gradients);
            }

            let train_loss =
                target_scaler.unscale_mse(mean_squared_error(&network.predict(&X_train), &y_train));
            if !train_loss.is_finite() {
                return Err(AqiError::TrainingDiverged {
                    epoch,
                    loss: train_loss,
                });
            }
            let val_loss = has_validation.then(|| {
                target_scaler.unscale_mse(mean_squared_error(&network.predict(&X_val), &y_val))
            });

            history.record(epoch, train_loss, val_loss);
            tracing::debug!(epoch, train_loss, ?val_loss, "epoch finished");
            if epoch % log_every == 0 || epoch == config.epochs {
                match val_loss {
                    Some(v) => tracing::info!(
                        "Epoch {}/{} - loss: {:.4}, val_loss: {:.4}",
                        epoch,
                        config.epochs,
                        train_loss,
                        v
                    ),
                    None => tracing::info!("Epoch {}/{} - loss: {:.4}", epoch, config.epochs, train_loss),
                }
            }
        }

        let warnings = check_convergence(&history, config.convergence_tolerance);
        for warning in &warnings {
            tracing::warn!("Convergence warning: {}", warning);
        }

        let metadata = ModelMetadata {
            trained_at: Utc::now(),
            training_rows: X_train.nrows(),
            validation_rows: X_val.nrows(),
            epochs_run: history.len(),
            final_train_loss: history.final_train_loss().unwrap_or(f64::NAN),
            final_validation_loss: history.final_validation_loss(),
        };

        let model = AqiModel {
            format_version: MODEL_FORMAT_VERSION,
            schema: expected,
            network,
            normalizer,
            target_scaler,
            config: config.clone(),
            metadata,
        };

        Ok(TrainingOutcome {
            model,
            history,
            warnings,
        })
    }

    /// Обучение и запись модели в `path`
    pub fn train_and_save(
        &self,
        features: &FeatureMatrix,
        target: &TargetVector,
        path: &Path,
    ) -> Result<TrainingOutcome> {
        let outcome = self.fit(features, target)?;
        outcome.model.save(path)?;
        Ok(outcome)
    }

    fn split(&self, features: &FeatureMatrix, target: &TargetVector, rng: &mut StdRng) -> Result<Split> {
        let n_samples = features.nrows();
        let mut indices: Vec<usize> = (0..n_samples).collect();
        indices.shuffle(rng);

        let n_val = (n_samples as f64 * self.config.validation_split).round() as usize;
        let n_train = n_samples - n_val.min(n_samples);
        if n_train < 2 {
            return Err(AqiError::InsufficientData {
                rows: n_train,
                required: 2,
            });
        }

        let (train_idx, val_idx) = indices.split_at(n_train);
        Ok(Split {
            X_train: features.values.select(Axis(0), train_idx),
            y_train: target.values.select(Axis(0), train_idx),
            X_val: features.values.select(Axis(0), val_idx),
            y_val: target.values.select(Axis(0), val_idx),
        })
    }
}

pub fn check_convergence(history: &TrainingHistory, tolerance: f64) -> Vec<ConvergenceWarning> {
    let mut warnings = Vec::new();

    if history.len() >= 2 {
        let first = history.train_loss[0];
        let last = history.train_loss[history.len() - 1];
        // Нулевой loss на первой эпохе: улучшать нечего
        if first > 0.0 && (first - last) / first < tolerance {
            warnings.push(ConvergenceWarning::LossNotDecreasing { first, last });
        }
    }

    if let (Some((best_epoch, best)), Some(last)) =
        (history.best_validation(), history.final_validation_loss())
    {
        if best > 0.0 && last > best * OVERFIT_RATIO {
            warnings.push(ConvergenceWarning::ValidationLossIncreasing {
                best_epoch,
                best,
                last,
            });
        }
    }

    warnings
}
