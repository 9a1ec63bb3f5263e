pub mod artifact;
pub mod config;
pub mod drift;
pub mod error;
pub mod schema;

pub use artifact::{IngestionArtifact, ValidationArtifact, ValidationFinding};
pub use config::{
    ColumnCountBasis, IngestionConfig, PipelineConfig, ValidationConfig, check_drift_threshold,
};
pub use drift::{ColumnDrift, DriftReport};
pub use error::{ErrorKind, GateError, Operation, Partition, Result};
pub use schema::{ColumnSpec, SchemaDefinition};
