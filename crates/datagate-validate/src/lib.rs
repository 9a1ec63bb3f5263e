//! Data validation stage: schema checks, KS drift detection and the
//! valid/invalid gate in front of model training.

pub mod columns;
pub mod drift;
pub mod ks;
mod validator;

pub use columns::{column_count_matches, missing_columns, non_numeric_columns, observed_count};
pub use drift::{compute_drift_report, is_drift, numeric_sample, write_drift_report};
pub use ks::{EXACT_MAX_CELLS, KsError, KsMethod, KsResult, ks_2samp};
pub use validator::DataValidator;
