//! Reference tables for the curbside address resolver.
//!
//! The resolver reads two tables: `blocks` (street segments with house-number
//! ranges per side and a linestring geometry) and `intersections` (pairs of
//! street descriptors with a point geometry). This crate knows their column
//! layout, loads them from disk or memory, and hands out per-call views of
//! them through [`DatasetHandle`].

pub mod schema;
mod tables;
pub mod test_data;

/// Environment variable holding the dataset location (directory of table files).
pub const DATASET_URI_ENV: &str = "CURBSIDE_DATASET_URI";
/// Environment variable selecting the table file format (`parquet` or `csv`).
pub const DATASET_FORMAT_ENV: &str = "CURBSIDE_DATASET_FORMAT";

mod error {
    use std::path::PathBuf;

    use polars::prelude::PolarsError;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum DataError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
        #[error("Polars error: {0}")]
        Polars(#[from] PolarsError),
        #[error("No dataset location configured, set {}", crate::DATASET_URI_ENV)]
        MissingDatasetUri,
        #[error("Unsupported dataset format: {0}")]
        UnsupportedFormat(String),
        #[error("Dataset file not found: {0}")]
        DatasetNotFound(PathBuf),
        #[error("Table '{table}' is missing required columns: {columns:?}")]
        MissingColumns {
            table: &'static str,
            columns: Vec<String>,
        },
    }

    pub type Result<T> = std::result::Result<T, DataError>;
}

pub use error::{DataError, Result};
pub use tables::{DatasetFormat, DatasetHandle, DatasetSource, Table};
