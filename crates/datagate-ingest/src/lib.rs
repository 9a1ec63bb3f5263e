pub mod ingestion;
pub mod table;

pub use ingestion::{DataIngestion, SplitIndices, split_indices};
pub use table::{
    TableReadOptions, ensure_parent_dir, load_table, load_table_with_options, remove_table,
    write_table,
};
