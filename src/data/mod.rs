//! Data module - CSV loading and preprocessing

pub mod loader;
pub mod pipeline;

pub use loader::{load_csv, LoaderError};
pub use pipeline::{preprocess, PipelineError, AMOUNT_COL, CLASS_COL, NORMALIZED_AMOUNT_COL};
