use std::fs;

use polars::prelude::{DataFrame, NamedFrom, Series};

use datagate_ingest::{
    TableReadOptions, load_table, load_table_with_options, remove_table, write_table,
};
use datagate_model::{ErrorKind, Operation};

#[test]
fn loads_table_preserving_column_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("train.csv");
    fs::write(&path, "zeta,alpha,mid\n1,2.5,x\n3,4.5,y\n").expect("write csv");

    let df = load_table(&path).expect("load table");
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    assert_eq!(df.height(), 2);
}

#[test]
fn missing_file_is_data_access_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.csv");

    let error = load_table(&path).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::DataAccess);
    assert_eq!(error.operation(), Operation::LoadTable);
    assert!(error.to_string().contains("absent.csv"));
}

#[test]
fn empty_file_is_data_access_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("empty.csv");
    fs::write(&path, "").expect("write csv");

    let error = load_table(&path).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::DataAccess);
}

#[test]
fn null_values_are_read_as_null() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("raw.csv");
    fs::write(&path, "a,b\n1,na\n2,3\n").expect("write csv");

    let options = TableReadOptions::default().with_null_values(["na"]);
    let df = load_table_with_options(&path, &options).expect("load table");
    let column = df.column("b").expect("column b");
    assert_eq!(column.null_count(), 1);
}

#[test]
fn written_table_round_trips() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested").join("valid").join("train.csv");
    let df = DataFrame::new(vec![
        Series::new("id".into(), vec![1i64, 2, 3]).into(),
        Series::new("score".into(), vec![0.1f64, 2.5, -3.75]).into(),
        Series::new("label".into(), vec!["a,b", "plain", "quote\"d"]).into(),
    ])
    .expect("frame");

    write_table(&df, &path).expect("write table");
    let round = load_table(&path).expect("reload table");

    assert!(round.equals_missing(&df));
    let text = fs::read_to_string(&path).expect("read back");
    assert!(text.starts_with("id,score,label\n"));
}

#[test]
fn remove_table_tolerates_missing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("train.csv");
    let df = DataFrame::new(vec![Series::new("id".into(), vec![1i64, 2]).into()]).expect("frame");

    write_table(&df, &path).expect("write table");
    remove_table(&path).expect("remove table");
    assert!(!path.exists());
    remove_table(&path).expect("second remove is a no-op");
}
