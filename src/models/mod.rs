/// ML модели

pub mod history;
pub mod model;
pub mod network;
pub mod optimizer;
pub mod predictor;
pub mod trainer;

pub use history::TrainingHistory;
pub use model::{AqiModel, ModelMetadata, MODEL_FORMAT_VERSION};
pub use network::FeedForwardNetwork;
pub use predictor::Predictor;
pub use trainer::{ConvergenceWarning, ModelTrainer, TrainingOutcome};
