use aqi_ml::synthetic::{self, SyntheticConfig};
use aqi_ml::{
    feature_matrix, split_features_and_target, AqiError, AqiModel, Dataset, DatasetLoader,
    ModelTrainer, Predictor, TrainingConfig,
};
use tempfile::TempDir;

fn quick_config() -> TrainingConfig {
    TrainingConfig {
        epochs: 20,
        ..Default::default()
    }
}

fn sample(rows: usize) -> Dataset {
    synthetic::generate(&SyntheticConfig {
        rows,
        ..Default::default()
    })
}

#[test]
fn csv_row_count_matches_dataset() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("history.csv");
    synthetic::write_dataset_file(&sample(37), &path).unwrap();

    let dataset = DatasetLoader::new().load(&path).unwrap();
    assert_eq!(dataset.len(), 37);

    let (features, target) = split_features_and_target(&dataset).unwrap();
    assert_eq!(features.values.dim(), (37, 10));
    assert_eq!(target.len(), 37);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = DatasetLoader::new()
        .load(std::path::Path::new("/definitely/not/here.csv"))
        .unwrap_err();
    assert!(matches!(err, AqiError::Io { .. }));
}

#[test]
fn saved_model_predicts_identically() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let model_path = temp_dir.path().join("model.json");
    let dataset = sample(60);
    let (features, target) = split_features_and_target(&dataset).unwrap();

    let outcome = ModelTrainer::new(quick_config())
        .unwrap()
        .train_and_save(&features, &target, &model_path)
        .unwrap();

    let in_memory = Predictor::new(outcome.model).predict(&dataset).unwrap();
    let from_disk = Predictor::load(&model_path).unwrap().predict(&dataset).unwrap();
    assert_eq!(in_memory, from_disk);
}

#[test]
fn training_is_deterministic_for_a_seed() {
    let dataset = sample(50);
    let (features, target) = split_features_and_target(&dataset).unwrap();

    let a = ModelTrainer::new(quick_config()).unwrap().fit(&features, &target).unwrap();
    let b = ModelTrainer::new(quick_config()).unwrap().fit(&features, &target).unwrap();

    let matrix = feature_matrix(&dataset);
    assert_eq!(a.model.predict(&matrix).unwrap(), b.model.predict(&matrix).unwrap());
}

#[test]
fn schema_mismatch_is_rejected() {
    let subset = TrainingConfig {
        features: vec!["PM2.5".into(), "PM10".into(), "NO2".into()],
        ..quick_config()
    };
    let dataset = sample(40);
    let narrow = DatasetLoader::with_schema(subset.schema());

    let mut buffer = Vec::new();
    synthetic::write_dataset(&dataset, &mut buffer).unwrap();
    let narrow_dataset = narrow.read_from(buffer.as_slice()).unwrap();
    let (features, target) = split_features_and_target(&narrow_dataset).unwrap();
    let outcome = ModelTrainer::new(subset).unwrap().fit(&features, &target).unwrap();

    let err = Predictor::new(outcome.model).predict(&dataset).unwrap_err();
    match err {
        AqiError::SchemaMismatch { expected, found } => {
            assert_eq!(expected.len(), 3);
            assert_eq!(found.len(), 10);
        }
        other => panic!("expected schema mismatch, got {other:?}"),
    }
}

#[test]
fn subset_model_reads_full_csv() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("history.csv");
    synthetic::write_dataset_file(&sample(30), &path).unwrap();

    let subset = TrainingConfig {
        features: vec!["PM2.5".into(), "PM10".into()],
        ..quick_config()
    };
    let dataset = DatasetLoader::with_schema(subset.schema()).load(&path).unwrap();
    let (features, target) = split_features_and_target(&dataset).unwrap();
    let outcome = ModelTrainer::new(subset).unwrap().fit(&features, &target).unwrap();

    let predictor = Predictor::new(outcome.model);
    let data = predictor.load_dataset(&path).unwrap();
    assert_eq!(data.schema().len(), 2);
    assert_eq!(predictor.predict(&data).unwrap().len(), 30);
}

#[test]
fn unsupported_model_version_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("model.json");
    let dataset = sample(20);
    let (features, target) = split_features_and_target(&dataset).unwrap();
    let mut model = ModelTrainer::new(quick_config())
        .unwrap()
        .fit(&features, &target)
        .unwrap()
        .model;
    model.format_version = 99;
    model.save(&path).unwrap();

    assert!(matches!(
        AqiModel::load(&path),
        Err(AqiError::UnsupportedModelVersion { found: 99, expected: 1 })
    ));
}

#[test]
fn learns_linear_pm25_relationship() {
    let dataset = sample(100);
    let records = dataset.records();
    let train = Dataset::new(dataset.schema().clone(), records[..99].to_vec(), true).unwrap();
    let held_out = Dataset::new(dataset.schema().clone(), records[99..].to_vec(), true).unwrap();

    let config = TrainingConfig {
        epochs: 400,
        validation_split: 0.1,
        ..Default::default()
    };
    let (features, target) = split_features_and_target(&train).unwrap();
    let outcome = ModelTrainer::new(config).unwrap().fit(&features, &target).unwrap();

    let results = Predictor::new(outcome.model).predict(&held_out).unwrap();
    let error = results[0].error.unwrap();
    let expected = synthetic::expected_aqi(held_out.records()[0].features[0]);
    assert_eq!(results[0].actual, Some(expected));
    assert!(
        error < 20.0,
        "held-out error {error:.2} (predicted {:.2}, actual {expected:.2})",
        results[0].predicted
    );
}
