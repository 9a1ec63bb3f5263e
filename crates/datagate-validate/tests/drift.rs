//! Drift report behaviour on in-memory tables.

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use datagate_model::{DriftReport, ErrorKind};
use datagate_validate::{compute_drift_report, is_drift, ks_2samp};

fn frame(columns: Vec<(&str, Vec<f64>)>) -> DataFrame {
    let cols: Vec<Column> = columns
        .into_iter()
        .map(|(name, values)| Series::new(name.into(), values).into_column())
        .collect();
    DataFrame::new(cols).unwrap()
}

fn normal_sample(seed: u64, mean: f64, len: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(mean, 1.0).unwrap();
    (0..len).map(|_| normal.sample(&mut rng)).collect()
}

#[test]
fn identical_columns_do_not_drift() {
    let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
    let base = frame(vec![("x", values.clone())]);
    let current = frame(vec![("x", values)]);

    let report = compute_drift_report(&base, &current, 0.05).unwrap();
    let entry = report.get("x").unwrap();
    assert_eq!(entry.p_value, 1.0);
    assert!(!entry.drift_status);
    assert!(!report.has_drift());
}

#[test]
fn shifted_normal_columns_drift() {
    let base = frame(vec![("x", normal_sample(7, 0.0, 1000))]);
    let current = frame(vec![("x", normal_sample(11, 5.0, 1000))]);

    let report = compute_drift_report(&base, &current, 0.05).unwrap();
    let entry = report.get("x").unwrap();
    assert!(entry.p_value < 1e-10, "p-value {}", entry.p_value);
    assert!(entry.drift_status);
    assert_eq!(report.drifted_columns(), vec!["x".to_string()]);
}

#[test]
fn p_value_at_threshold_is_not_drift() {
    assert!(!is_drift(0.05, 0.05));
    assert!(is_drift(0.049_999, 0.05));

    // Two of the twenty equally likely lattice paths reach a corner: p = 0.1.
    let base = frame(vec![("x", vec![1.0, 2.0, 3.0])]);
    let current = frame(vec![("x", vec![4.0, 5.0, 6.0])]);
    let report = compute_drift_report(&base, &current, 0.1).unwrap();
    let entry = report.get("x").unwrap();
    assert_eq!(entry.p_value, 0.1);
    assert!(!entry.drift_status);
}

#[test]
fn report_has_one_entry_per_base_column() {
    let base = frame(vec![
        ("b", vec![1.0, 2.0, 3.0]),
        ("a", vec![4.0, 5.0, 6.0]),
    ]);
    let current = frame(vec![
        ("a", vec![4.0, 5.0, 6.0]),
        ("extra", vec![0.0, 0.0, 0.0]),
        ("b", vec![1.0, 2.0, 3.0]),
    ]);

    let report = compute_drift_report(&base, &current, 0.05).unwrap();
    let columns: Vec<&str> = report.columns().collect();
    assert_eq!(columns, vec!["b", "a"]);
}

#[test]
fn base_column_missing_from_current_is_an_error() {
    let base = frame(vec![("a", vec![1.0, 2.0]), ("b", vec![3.0, 4.0])]);
    let current = frame(vec![("a", vec![1.0, 2.0])]);

    let error = compute_drift_report(&base, &current, 0.05).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::DriftComputation);
    assert!(error.to_string().contains("`b`"));
}

#[test]
fn non_numeric_column_is_an_error() {
    let base = DataFrame::new(vec![
        Series::new("label".into(), vec!["x", "y"]).into_column(),
    ])
    .unwrap();

    let error = compute_drift_report(&base, &base, 0.05).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::DriftComputation);
    assert!(error.to_string().contains("label"));
}

#[test]
fn nulls_are_ignored() {
    let base = DataFrame::new(vec![
        Series::new("x".into(), vec![Some(1.0), None, Some(2.0), Some(3.0)]).into_column(),
    ])
    .unwrap();
    let current = frame(vec![("x", vec![1.0, 2.0, 3.0])]);

    let report = compute_drift_report(&base, &current, 0.05).unwrap();
    assert_eq!(report.get("x").unwrap().p_value, 1.0);
}

#[test]
fn report_yaml_keeps_column_order() {
    let base = frame(vec![("a", vec![1.0, 2.0, 3.0]), ("b", vec![1.0, 2.0, 3.0])]);
    let current = frame(vec![("a", vec![1.0, 2.0, 3.0]), ("b", vec![4.0, 5.0, 6.0])]);

    let report = compute_drift_report(&base, &current, 0.05).unwrap();
    let yaml = report.to_yaml_string().unwrap();
    insta::assert_snapshot!(yaml, @r"
    a:
      p_value: 1.0
      drift_status: false
    b:
      p_value: 0.1
      drift_status: false
    ");
    assert_eq!(DriftReport::from_yaml_str(&yaml).unwrap(), report);
}

proptest! {
    #[test]
    fn p_value_ignores_argument_order(
        first in prop::collection::vec(-100.0f64..100.0, 1..40),
        second in prop::collection::vec(-100.0f64..100.0, 1..40),
    ) {
        let forward = ks_2samp(&first, &second).unwrap();
        let backward = ks_2samp(&second, &first).unwrap();
        prop_assert_eq!(forward.p_value.to_bits(), backward.p_value.to_bits());
        prop_assert_eq!(forward.statistic.to_bits(), backward.statistic.to_bits());
    }

    #[test]
    fn repeated_reports_are_identical(
        base in prop::collection::vec(-10.0f64..10.0, 2..30),
        current in prop::collection::vec(-10.0f64..10.0, 2..30),
    ) {
        let len = base.len().min(current.len());
        let base = frame(vec![("x", base[..len].to_vec())]);
        let current = frame(vec![("x", current[..len].to_vec())]);

        let first = compute_drift_report(&base, &current, 0.05).unwrap();
        let second = compute_drift_report(&base, &current, 0.05).unwrap();
        prop_assert_eq!(first.to_yaml_string().unwrap(), second.to_yaml_string().unwrap());
        prop_assert_eq!(first.has_drift(), second.has_drift());
    }

    #[test]
    fn p_value_is_a_probability(
        first in prop::collection::vec(-5.0f64..5.0, 1..25),
        second in prop::collection::vec(-5.0f64..5.0, 1..25),
    ) {
        let result = ks_2samp(&first, &second).unwrap();
        prop_assert!((0.0..=1.0).contains(&result.p_value));
        prop_assert!((0.0..=1.0).contains(&result.statistic));
    }
}
