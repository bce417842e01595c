//! Address search over the `blocks` table.

use std::{fmt, sync::Arc};

use curbside_data::{DatasetHandle, Table, schema::blocks};
use itertools::Itertools;
use polars::prelude::*;
use tracing::{debug, info, instrument, warn};

use super::{
    Filter, GeocodeResult, Interpolation, MatchedFeature, NumberRange, SegmentRanges,
    int_column, required, text_column,
};
use crate::{
    correction::{NoCorrection, SpellingCorrector, correct_token},
    error::{GeocodingError, Result},
    geometry::{GeometryProvider, PlanarGeometry, parse_point},
    query::AddressQuery,
};

/// One row of the `blocks` table.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetSegmentRecord {
    pub id: i64,
    pub pretty_name: Option<String>,
    pub street: String,
    pub pre_dir: Option<String>,
    pub suffix: Option<String>,
    pub post_dir: Option<String>,
    pub ranges: SegmentRanges,
    pub left_city: Option<String>,
    pub right_city: Option<String>,
    pub left_state: Option<String>,
    pub right_state: Option<String>,
    pub left_zip: Option<String>,
    pub right_zip: Option<String>,
    /// Linear geometry as stored, usually EWKT.
    pub geometry: String,
}

impl StreetSegmentRecord {
    /// Read every row of a `blocks` frame, in order.
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let table = Table::Blocks.name();
        let id = int_column(df, blocks::ID)?;
        let pretty_name = text_column(df, blocks::PRETTY_NAME)?;
        let street = text_column(df, blocks::STREET)?;
        let pre_dir = text_column(df, blocks::PREDIR)?;
        let suffix = text_column(df, blocks::SUFFIX)?;
        let post_dir = text_column(df, blocks::POSTDIR)?;
        let from_num = int_column(df, blocks::FROM_NUM)?;
        let to_num = int_column(df, blocks::TO_NUM)?;
        let left_from_num = int_column(df, blocks::LEFT_FROM_NUM)?;
        let left_to_num = int_column(df, blocks::LEFT_TO_NUM)?;
        let right_from_num = int_column(df, blocks::RIGHT_FROM_NUM)?;
        let right_to_num = int_column(df, blocks::RIGHT_TO_NUM)?;
        let left_city = text_column(df, blocks::LEFT_CITY)?;
        let right_city = text_column(df, blocks::RIGHT_CITY)?;
        let left_state = text_column(df, blocks::LEFT_STATE)?;
        let right_state = text_column(df, blocks::RIGHT_STATE)?;
        let left_zip = text_column(df, blocks::LEFT_ZIP)?;
        let right_zip = text_column(df, blocks::RIGHT_ZIP)?;
        let geometry = text_column(df, blocks::GEOM)?;

        let owned = |value: Option<&str>| value.map(ToString::to_string);

        (0..df.height())
            .map(|i| {
                Ok(Self {
                    id: required(id.get(i), table, blocks::ID)?,
                    pretty_name: owned(pretty_name.get(i)),
                    street: required(street.get(i), table, blocks::STREET)?.to_string(),
                    pre_dir: owned(pre_dir.get(i)),
                    suffix: owned(suffix.get(i)),
                    post_dir: owned(post_dir.get(i)),
                    ranges: SegmentRanges::new(
                        NumberRange::new(from_num.get(i), to_num.get(i)),
                        NumberRange::new(left_from_num.get(i), left_to_num.get(i)),
                        NumberRange::new(right_from_num.get(i), right_to_num.get(i)),
                    ),
                    left_city: owned(left_city.get(i)),
                    right_city: owned(right_city.get(i)),
                    left_state: owned(left_state.get(i)),
                    right_state: owned(right_state.get(i)),
                    left_zip: owned(left_zip.get(i)),
                    right_zip: owned(right_zip.get(i)),
                    geometry: required(geometry.get(i), table, blocks::GEOM)?.to_string(),
                })
            })
            .collect()
    }
}

/// Position of `number` within `range`, 0 at `from_num` and 1 at `to_num`.
///
/// No number gives 0.5, as does a single-number range. A range with a
/// missing bound cannot be interpolated and is an error.
pub fn interpolation_fraction(number: Option<i64>, range: NumberRange) -> Result<f64> {
    let Some(number) = number.filter(|n| *n != 0) else {
        return Ok(0.5);
    };
    let (Some(from_num), Some(to_num)) = (range.from_num, range.to_num) else {
        return Err(GeocodingError::InvalidRange {
            number,
            from_num: range.from_num,
            to_num: range.to_num,
        });
    };
    if from_num == to_num {
        return Ok(0.5);
    }
    Ok((number as f64 - from_num as f64) / (to_num as f64 - from_num as f64))
}

/// Resolves [`AddressQuery`]s to points along matching street segments.
///
/// Candidates come from a single filtered read of the `blocks` table. Each
/// candidate is checked with [`SegmentRanges::contains_number`] and, when it
/// matches, placed along its geometry by the [`GeometryProvider`].
#[derive(Clone)]
pub struct BlockSearcher {
    dataset: Arc<DatasetHandle>,
    geometry: Arc<dyn GeometryProvider>,
    corrector: Arc<dyn SpellingCorrector>,
    max_candidates: Option<usize>,
}

impl fmt::Debug for BlockSearcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockSearcher")
            .field("dataset", &self.dataset)
            .field("max_candidates", &self.max_candidates)
            .finish_non_exhaustive()
    }
}

impl BlockSearcher {
    /// A searcher with planar interpolation and no spelling correction.
    pub fn new(dataset: Arc<DatasetHandle>) -> Self {
        Self {
            dataset,
            geometry: Arc::new(PlanarGeometry),
            corrector: Arc::new(NoCorrection),
            max_candidates: None,
        }
    }

    pub fn with_geometry(mut self, geometry: Arc<dyn GeometryProvider>) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_corrector(mut self, corrector: Arc<dyn SpellingCorrector>) -> Self {
        self.corrector = corrector;
        self
    }

    /// Cap the number of candidate rows read per search.
    pub const fn with_max_candidates(mut self, max_candidates: Option<usize>) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    #[must_use]
    pub fn dataset(&self) -> &Arc<DatasetHandle> {
        &self.dataset
    }

    /// All matching segments with their interpolated points.
    ///
    /// Results keep the table's row order. Any failure while placing a
    /// matched segment fails the whole call; see
    /// [`search_partitioned`](Self::search_partitioned) to keep the rest.
    #[instrument(name = "Block Search", level = "info", skip_all, fields(query = %query))]
    pub fn search(&self, query: &AddressQuery) -> Result<Vec<GeocodeResult>> {
        let candidates = self.candidates(query)?;
        let results = candidates
            .into_iter()
            .filter_map(|record| self.resolve(record, query.number()).transpose())
            .collect::<Result<Vec<_>>>()?;
        info!(results = results.len(), "Block search complete");
        Ok(results)
    }

    /// Like [`search`](Self::search), but segments that fail to resolve are
    /// returned alongside the successful results instead of failing the call.
    #[instrument(name = "Partitioned Block Search", level = "info", skip_all, fields(query = %query))]
    pub fn search_partitioned(
        &self,
        query: &AddressQuery,
    ) -> Result<(Vec<GeocodeResult>, Vec<GeocodingError>)> {
        let candidates = self.candidates(query)?;
        let (results, failures): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .filter_map(|record| self.resolve(record, query.number()).transpose())
            .partition_result();
        for failure in &failures {
            warn!(error = %failure, "Matched segment could not be placed");
        }
        info!(
            results = results.len(),
            failures = failures.len(),
            "Block search complete"
        );
        Ok((results, failures))
    }

    /// The segment with identifier `id`.
    #[instrument(name = "Block Lookup", level = "debug", skip(self))]
    pub fn get(&self, id: i64) -> Result<StreetSegmentRecord> {
        let df = self
            .dataset
            .blocks()?
            .filter(col(blocks::ID).eq(lit(id)))
            .limit(1)
            .collect()?;
        StreetSegmentRecord::from_frame(&df)?
            .into_iter()
            .next()
            .ok_or(GeocodingError::DoesNotExist {
                entity: Table::Blocks.name(),
                id,
            })
    }

    fn candidate_filter(&self, query: &AddressQuery) -> Filter {
        let street = correct_token(self.corrector.as_ref(), query.street());
        let filter = Filter::new()
            .equals(blocks::STREET, Some(&street))
            .equals(blocks::PREDIR, query.pre_dir())
            .equals(blocks::SUFFIX, query.suffix())
            .equals(blocks::POSTDIR, query.post_dir())
            .equals_any(&[blocks::LEFT_CITY, blocks::RIGHT_CITY], query.city())
            .equals_any(&[blocks::LEFT_STATE, blocks::RIGHT_STATE], query.state())
            .equals_any(&[blocks::LEFT_ZIP, blocks::RIGHT_ZIP], query.postal_code());
        match query.number() {
            // Coarse pre-filter, the exact test is the parity check.
            Some(number) => filter.push(
                col(blocks::FROM_NUM)
                    .lt_eq(lit(number))
                    .or(col(blocks::TO_NUM).gt_eq(lit(number))),
            ),
            None => filter,
        }
    }

    fn candidates(&self, query: &AddressQuery) -> Result<Vec<StreetSegmentRecord>> {
        let filter = self.candidate_filter(query);
        debug!(clauses = filter.len(), "Built block filter");

        let mut frame = filter.apply(self.dataset.blocks()?);
        if let Some(limit) = self.max_candidates {
            frame = frame.limit(limit as IdxSize);
        }
        let records = StreetSegmentRecord::from_frame(&frame.collect()?)?;
        if self.max_candidates.is_some_and(|limit| records.len() >= limit) {
            warn!(
                limit = records.len(),
                "Block candidate limit reached, results may be incomplete"
            );
        }
        debug!(candidates = records.len(), "Fetched block candidates");
        Ok(records)
    }

    fn resolve(
        &self,
        record: StreetSegmentRecord,
        number: Option<i64>,
    ) -> Result<Option<GeocodeResult>> {
        let containment = record.ranges.contains_number(number);
        if !containment.matches {
            debug!(
                block = record.id,
                side = %containment.side,
                range = %containment.range,
                "Number not on segment"
            );
            return Ok(None);
        }

        let fraction = interpolation_fraction(number, containment.range)?;
        let representation = self.geometry.interpolate(&record.geometry, fraction)?;
        let point = parse_point(&representation)?;
        debug!(
            block = record.id,
            side = %containment.side,
            fraction,
            "Segment matched"
        );

        Ok(Some(GeocodeResult {
            x: point.x(),
            y: point.y(),
            representation,
            interpolation: Some(Interpolation {
                fraction,
                range: containment.range,
                side: containment.side,
            }),
            feature: MatchedFeature::Block(record),
        }))
    }
}
