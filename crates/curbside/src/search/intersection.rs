//! Two-street search over the `intersections` table.

use std::{fmt, sync::Arc};

use curbside_data::{DatasetHandle, Table, schema::intersections as ix};
use polars::prelude::*;
use tracing::{debug, info, instrument, warn};

use super::{Filter, int_column, required, text_column};
use crate::{
    correction::{NoCorrection, SpellingCorrector, correct_token},
    error::{GeocodingError, Result},
    query::{IntersectionDescriptor, IntersectionQuery},
};

/// One row of the `intersections` table.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersectionRecord {
    pub id: i64,
    pub pretty_name: Option<String>,
    pub a: IntersectionDescriptor,
    pub b: IntersectionDescriptor,
    /// Point geometry as stored, usually EWKT.
    pub location: String,
}

impl IntersectionRecord {
    /// Read every row of an `intersections` frame, in order.
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let table = Table::Intersections.name();
        let id = int_column(df, ix::ID)?;
        let pretty_name = text_column(df, ix::PRETTY_NAME)?;
        let pre_dir_a = text_column(df, ix::PREDIR_A)?;
        let street_a = text_column(df, ix::STREET_A)?;
        let suffix_a = text_column(df, ix::SUFFIX_A)?;
        let post_dir_a = text_column(df, ix::POSTDIR_A)?;
        let pre_dir_b = text_column(df, ix::PREDIR_B)?;
        let street_b = text_column(df, ix::STREET_B)?;
        let suffix_b = text_column(df, ix::SUFFIX_B)?;
        let post_dir_b = text_column(df, ix::POSTDIR_B)?;
        let location = text_column(df, ix::LOCATION)?;

        let owned = |value: Option<&str>| value.map(ToString::to_string);

        (0..df.height())
            .map(|i| {
                Ok(Self {
                    id: required(id.get(i), table, ix::ID)?,
                    pretty_name: owned(pretty_name.get(i)),
                    a: IntersectionDescriptor {
                        pre_dir: owned(pre_dir_a.get(i)),
                        street: owned(street_a.get(i)),
                        suffix: owned(suffix_a.get(i)),
                        post_dir: owned(post_dir_a.get(i)),
                    },
                    b: IntersectionDescriptor {
                        pre_dir: owned(pre_dir_b.get(i)),
                        street: owned(street_b.get(i)),
                        suffix: owned(suffix_b.get(i)),
                        post_dir: owned(post_dir_b.get(i)),
                    },
                    location: required(location.get(i), table, ix::LOCATION)?.to_string(),
                })
            })
            .collect()
    }
}

/// Finds intersections of two streets, whichever order they were stored in.
#[derive(Clone)]
pub struct IntersectionSearcher {
    dataset: Arc<DatasetHandle>,
    corrector: Arc<dyn SpellingCorrector>,
    max_candidates: Option<usize>,
}

impl fmt::Debug for IntersectionSearcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntersectionSearcher")
            .field("dataset", &self.dataset)
            .field("max_candidates", &self.max_candidates)
            .finish_non_exhaustive()
    }
}

impl IntersectionSearcher {
    pub fn new(dataset: Arc<DatasetHandle>) -> Self {
        Self {
            dataset,
            corrector: Arc::new(NoCorrection),
            max_candidates: None,
        }
    }

    pub fn with_corrector(mut self, corrector: Arc<dyn SpellingCorrector>) -> Self {
        self.corrector = corrector;
        self
    }

    pub const fn with_max_candidates(mut self, max_candidates: Option<usize>) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Every supplied field of either query side must appear on either
    /// stored side. Absent fields match anything.
    fn filter(&self, query: &IntersectionQuery) -> Filter {
        let street_a = query
            .a()
            .street
            .as_deref()
            .map(|s| correct_token(self.corrector.as_ref(), s));
        let street_b = query
            .b()
            .street
            .as_deref()
            .map(|s| correct_token(self.corrector.as_ref(), s));

        let mut filter = Filter::new();
        for side in [query.a(), query.b()] {
            filter = filter.equals_any(&[ix::PREDIR_A, ix::PREDIR_B], side.pre_dir.as_deref());
        }
        for street in [&street_a, &street_b] {
            filter = filter.equals_any(&[ix::STREET_A, ix::STREET_B], street.as_deref());
        }
        for side in [query.a(), query.b()] {
            filter = filter
                .equals_any(&[ix::SUFFIX_A, ix::SUFFIX_B], side.suffix.as_deref())
                .equals_any(&[ix::POSTDIR_A, ix::POSTDIR_B], side.post_dir.as_deref());
        }
        filter
    }

    /// All stored intersections matching `query`, in table order.
    #[instrument(name = "Intersection Search", level = "info", skip_all, fields(query = %query))]
    pub fn search(&self, query: &IntersectionQuery) -> Result<Vec<IntersectionRecord>> {
        let filter = self.filter(query);
        debug!(clauses = filter.len(), "Built intersection filter");

        let mut frame = filter.apply(self.dataset.intersections()?);
        if let Some(limit) = self.max_candidates {
            frame = frame.limit(limit as IdxSize);
        }
        let records = IntersectionRecord::from_frame(&frame.collect()?)?;
        if self.max_candidates.is_some_and(|limit| records.len() >= limit) {
            warn!(
                limit = records.len(),
                "Intersection limit reached, results may be incomplete"
            );
        }
        info!(results = records.len(), "Intersection search complete");
        Ok(records)
    }

    /// The intersection with identifier `id`.
    #[instrument(name = "Intersection Lookup", level = "debug", skip(self))]
    pub fn get(&self, id: i64) -> Result<IntersectionRecord> {
        let df = self
            .dataset
            .intersections()?
            .filter(col(ix::ID).eq(lit(id)))
            .limit(1)
            .collect()?;
        IntersectionRecord::from_frame(&df)?
            .into_iter()
            .next()
            .ok_or(GeocodingError::DoesNotExist {
                entity: Table::Intersections.name(),
                id,
            })
    }
}
