use thiserror::Error;

use crate::{geometry::PointParsingError, parse::ParsingError};

/// Every failure the resolver reports.
#[derive(Error, Debug)]
pub enum GeocodingError {
    #[error("{entity} with id {id} does not exist")]
    DoesNotExist { entity: &'static str, id: i64 },
    #[error(transparent)]
    PointParsing(#[from] PointParsingError),
    #[error(transparent)]
    Parsing(#[from] ParsingError),
    #[error("Dataset error: {0}")]
    Dataset(#[from] curbside_data::DataError),
    #[error("DataFrame error: {0}")]
    DataFrame(#[from] polars::prelude::PolarsError),
    #[error("Geometry provider error: {0}")]
    GeometryProvider(#[from] anyhow::Error),
    #[error("Column '{column}' of table '{table}' holds a null value")]
    NullValue {
        table: &'static str,
        column: &'static str,
    },
    #[error("Cannot interpolate {number} within range {from_num:?}..{to_num:?}")]
    InvalidRange {
        number: i64,
        from_num: Option<i64>,
        to_num: Option<i64>,
    },
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),
}

pub type Result<T> = std::result::Result<T, GeocodingError>;
