/// Модуль предобработки данных

pub mod loader;
pub mod normalization;
pub mod splitter;

pub use loader::DatasetLoader;
pub use normalization::{DataNormalizer, TargetScaler};
pub use splitter::{feature_matrix, split_features_and_target, FeatureMatrix, TargetVector};
