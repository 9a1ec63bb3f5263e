use std::fs;

use datagate_ingest::{DataIngestion, load_table};
use datagate_model::{ErrorKind, IngestionConfig, PipelineConfig};

fn raw_csv(rows: usize) -> String {
    let mut text = String::from("having_IP_Address,URL_Length,Result\n");
    for row in 0..rows {
        text.push_str(&format!("{},{},{}\n", row % 2, row * 3, if row % 3 == 0 { "na" } else { "1" }));
    }
    text
}

#[test]
fn ingestion_writes_feature_store_and_partitions() {
    let dir = tempfile::tempdir().expect("temp dir");
    let raw_path = dir.path().join("phisingData.csv");
    fs::write(&raw_path, raw_csv(20)).expect("write raw");
    let pipeline = PipelineConfig::new(dir.path().join("Artifacts"), "run");
    let config = IngestionConfig::from_pipeline(&pipeline, "phisingData.csv");

    let artifact = DataIngestion::new(config.clone())
        .initiate_data_ingestion(&raw_path)
        .expect("ingest");

    assert!(config.feature_store_file_path.is_file());
    let train = load_table(&artifact.trained_file_path).expect("train");
    let test = load_table(&artifact.test_file_path).expect("test");
    assert_eq!(test.height(), 4);
    assert_eq!(train.height(), 16);
    assert_eq!(train.get_column_names(), test.get_column_names());
}

#[test]
fn ingestion_is_reproducible_for_a_seed() {
    let dir = tempfile::tempdir().expect("temp dir");
    let raw_path = dir.path().join("raw.csv");
    fs::write(&raw_path, raw_csv(30)).expect("write raw");

    let run = |name: &str| {
        let pipeline = PipelineConfig::new(dir.path().join("Artifacts"), name);
        let config = IngestionConfig::from_pipeline(&pipeline, "raw.csv").with_seed(11);
        let artifact = DataIngestion::new(config)
            .initiate_data_ingestion(&raw_path)
            .expect("ingest");
        fs::read_to_string(artifact.test_file_path).expect("read test")
    };
    assert_eq!(run("first"), run("second"));
}

#[test]
fn too_few_rows_is_ingestion_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let raw_path = dir.path().join("raw.csv");
    fs::write(&raw_path, raw_csv(1)).expect("write raw");
    let pipeline = PipelineConfig::new(dir.path().join("Artifacts"), "run");
    let config = IngestionConfig::from_pipeline(&pipeline, "raw.csv");

    let error = DataIngestion::new(config.clone())
        .initiate_data_ingestion(&raw_path)
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Ingestion);
    assert!(!config.training_file_path.exists());
}
