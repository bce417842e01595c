//! Searchers over the reference tables.
//!
//! [`BlockSearcher`] resolves street addresses along segments, using the
//! parity rules in [`SegmentRanges`]. [`IntersectionSearcher`] matches two
//! street descriptors against stored intersections in either order.

mod block;
mod filter;
mod intersection;
mod parity;
mod result;

pub use block::{BlockSearcher, StreetSegmentRecord, interpolation_fraction};
pub use filter::Filter;
pub use intersection::{IntersectionRecord, IntersectionSearcher};
pub use parity::{Containment, NumberRange, RangeSide, SegmentRanges};
pub use result::{GeocodeResult, Interpolation, MatchedFeature};

use polars::prelude::*;

use crate::error::{GeocodingError, Result};

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    Ok(df.column(name)?.str()?)
}

fn int_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Int64Chunked> {
    Ok(df.column(name)?.i64()?)
}

fn required<T>(value: Option<T>, table: &'static str, column: &'static str) -> Result<T> {
    value.ok_or(GeocodingError::NullValue { table, column })
}
