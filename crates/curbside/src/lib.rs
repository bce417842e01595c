//! Curbside - street address and intersection resolution
//!
//! Curbside turns structured street addresses into points along street
//! segments, and pairs of street names into intersection points. It works
//! against two reference tables: `blocks`, street segments with house-number
//! ranges per side and a linestring geometry, and `intersections`, pairs of
//! street descriptors with a point geometry.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use curbside::{AddressQuery, DatasetHandle, Geocoder, GeocoderConfig};
//! use curbside::curbside_data::test_data::{sample_blocks, sample_intersections};
//!
//! let dataset = DatasetHandle::from_frames(sample_blocks()?, sample_intersections()?);
//! let geocoder = Geocoder::new(Arc::new(dataset), &GeocoderConfig::default())?;
//!
//! let query = AddressQuery::builder("Main").number(150).suffix("St").build()?;
//! for result in geocoder.geocode_address(&query)? {
//!     println!("{:?} at ({}, {})", result.pretty_name(), result.x, result.y);
//! }
//! # Ok::<(), curbside::error::GeocodingError>(())
//! ```
//!
//! # How an address is placed
//!
//! - Candidate segments are read with one filtered scan of `blocks`.
//! - The house number's parity picks the left or right side range of each
//!   candidate, falling back to the overall range when the sides are not
//!   parity-separable.
//! - The number's position within that range gives a fraction along the
//!   segment, and the [`GeometryProvider`] returns the point at that fraction.
//!
//! # Data
//!
//! Tables are loaded lazily, once, through [`DatasetHandle`]; point it at a
//! directory of Parquet or CSV files with `CURBSIDE_DATASET_URI`.
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod core;
mod correction;
pub mod error;
mod geometry;
mod parse;
mod query;
mod search;

pub use core::Geocoder;

pub use config::{DEFAULT_CORRECTION_THRESHOLD, GeocoderConfig, GeocoderConfigBuilder};
pub use correction::{Correction, NoCorrection, SpellingCorrector, StreetNameCorrector};
pub use curbside_data;
pub use curbside_data::{DatasetFormat, DatasetHandle, DatasetSource};
pub use geometry::{
    GeometryError, GeometryProvider, PlanarGeometry, PointParsingError, interpolate_along,
    parse_linestring, parse_point,
};
pub use parse::{LocationParser, ParsedLocation, ParsingError};
pub use polars;
pub use query::{AddressQuery, AddressQueryBuilder, IntersectionDescriptor, IntersectionQuery};
pub use search::{
    BlockSearcher, Containment, Filter, GeocodeResult, Interpolation, IntersectionRecord,
    IntersectionSearcher, MatchedFeature, NumberRange, RangeSide, SegmentRanges,
    StreetSegmentRecord, interpolation_fraction,
};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the curbside library.
///
/// Installs a `tracing` subscriber at `level`, unless `RUST_LOG` says
/// otherwise. Later calls are no-ops.
///
/// # Examples
///
/// ```rust
/// use curbside::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), curbside::error::GeocodingError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::GeocodingError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("polars=warn".parse()?)
            .add_directive("rayon=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|e| error::GeocodingError::ConfigError(e.to_string()))?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use curbside_data::test_data::{sample_blocks, sample_intersections};

    fn setup_test_env() {
        let _ = init_logging(tracing::Level::WARN);
    }

    fn geocoder() -> Geocoder {
        let dataset =
            DatasetHandle::from_frames(sample_blocks().unwrap(), sample_intersections().unwrap());
        Geocoder::new(Arc::new(dataset), &GeocoderConfig::default()).unwrap()
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        setup_test_env();
        assert!(init_logging(tracing::Level::DEBUG).is_ok());
    }

    #[test]
    fn test_basic_address() {
        setup_test_env();

        let query = AddressQuery::builder("Main").number(150).build().unwrap();
        let results = geocoder().geocode_address(&query).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].pretty_name(), Some("MAIN ST 100-199"));
        assert_eq!(results[0].interpolation.unwrap().side, RangeSide::Right);
    }

    #[test]
    fn test_empty_search() {
        setup_test_env();

        let query = AddressQuery::builder("XYZ123NONEXISTENT").build().unwrap();
        let results = geocoder().geocode_address(&query);
        assert!(results.is_ok(), "Non-existent street should not error");
        assert!(results.unwrap().is_empty());
    }
}
