//! The [`Geocoder`] facade over both searchers.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use curbside::{AddressQuery, DatasetHandle, Geocoder, GeocoderConfig, IntersectionQuery};
//! use curbside::curbside_data::test_data::{sample_blocks, sample_intersections};
//!
//! let dataset = DatasetHandle::from_frames(sample_blocks()?, sample_intersections()?);
//! let geocoder = Geocoder::new(Arc::new(dataset), &GeocoderConfig::default())?;
//!
//! let query = AddressQuery::builder("Tobin").number(25).build()?;
//! let results = geocoder.geocode_address(&query)?;
//! assert_eq!(results.len(), 1);
//!
//! let corners = geocoder.geocode_intersection(&IntersectionQuery::streets("Oak", "Main"))?;
//! assert_eq!(corners[0].pretty_name(), Some("MAIN ST & OAK ST"));
//! # Ok::<(), curbside::error::GeocodingError>(())
//! ```

use std::{fmt, sync::Arc};

use rayon::prelude::*;
use tracing::{info, instrument};

use crate::{
    config::GeocoderConfig,
    correction::{NoCorrection, SpellingCorrector, StreetNameCorrector},
    error::Result,
    geometry::{GeometryProvider, PlanarGeometry, parse_point},
    parse::{LocationParser, ParsedLocation},
    query::{AddressQuery, IntersectionQuery},
    search::{BlockSearcher, GeocodeResult, IntersectionRecord, IntersectionSearcher, MatchedFeature},
};
use curbside_data::DatasetHandle;

/// Resolves addresses and intersections against one dataset.
///
/// Cheap to clone; clones share the dataset handle and its loaded tables.
#[derive(Clone)]
pub struct Geocoder {
    dataset: Arc<DatasetHandle>,
    geometry: Arc<dyn GeometryProvider>,
    blocks: BlockSearcher,
    intersections: IntersectionSearcher,
}

impl fmt::Debug for Geocoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Geocoder")
            .field("blocks", &self.blocks)
            .field("intersections", &self.intersections)
            .finish_non_exhaustive()
    }
}

impl Geocoder {
    /// Build a geocoder over `dataset`.
    ///
    /// With a correction threshold configured, the street names of both
    /// tables are read up front to build a [`StreetNameCorrector`].
    #[instrument(name = "Create Geocoder", level = "info", skip(dataset))]
    pub fn new(dataset: Arc<DatasetHandle>, config: &GeocoderConfig) -> Result<Self> {
        let t_init = std::time::Instant::now();
        let corrector: Arc<dyn SpellingCorrector> = match config.street_correction_threshold {
            Some(threshold) => Arc::new(StreetNameCorrector::from_dataset(&dataset, threshold)?),
            None => Arc::new(NoCorrection),
        };
        let geometry: Arc<dyn GeometryProvider> = Arc::new(PlanarGeometry);

        let blocks = BlockSearcher::new(Arc::clone(&dataset))
            .with_geometry(Arc::clone(&geometry))
            .with_corrector(Arc::clone(&corrector))
            .with_max_candidates(config.max_candidates);
        let intersections = IntersectionSearcher::new(Arc::clone(&dataset))
            .with_corrector(corrector)
            .with_max_candidates(config.max_candidates);

        info!(elapsed_seconds = ?t_init.elapsed(), "Geocoder ready");
        Ok(Self {
            dataset,
            geometry,
            blocks,
            intersections,
        })
    }

    /// Build a geocoder over the dataset named by `CURBSIDE_DATASET_URI`.
    pub fn from_env(config: &GeocoderConfig) -> Result<Self> {
        let dataset = DatasetHandle::from_env()?;
        Self::new(Arc::new(dataset), config)
    }

    /// Use another geometry provider for block interpolation and intersection points.
    pub fn with_geometry(mut self, geometry: Arc<dyn GeometryProvider>) -> Self {
        self.blocks = self.blocks.with_geometry(Arc::clone(&geometry));
        self.geometry = geometry;
        self
    }

    pub fn with_corrector(mut self, corrector: Arc<dyn SpellingCorrector>) -> Self {
        self.blocks = self.blocks.with_corrector(Arc::clone(&corrector));
        self.intersections = self.intersections.with_corrector(corrector);
        self
    }

    #[must_use]
    pub fn dataset(&self) -> &Arc<DatasetHandle> {
        &self.dataset
    }

    #[must_use]
    pub const fn blocks(&self) -> &BlockSearcher {
        &self.blocks
    }

    #[must_use]
    pub const fn intersections(&self) -> &IntersectionSearcher {
        &self.intersections
    }

    /// Parse `raw` with `parser` and resolve whatever it describes.
    ///
    /// Parser failures come back unchanged as [`crate::error::GeocodingError::Parsing`].
    #[instrument(name = "Geocode", level = "info", skip(self, parser))]
    pub fn geocode(&self, parser: &dyn LocationParser, raw: &str) -> Result<Vec<GeocodeResult>> {
        let normalized = parser.normalize(raw);
        match parser.parse(&normalized)? {
            ParsedLocation::Address(query) => self.geocode_address(&query),
            ParsedLocation::Intersection(query) => self.geocode_intersection(&query),
        }
    }

    pub fn geocode_address(&self, query: &AddressQuery) -> Result<Vec<GeocodeResult>> {
        self.blocks.search(query)
    }

    /// Matching intersections, located at their stored points.
    pub fn geocode_intersection(&self, query: &IntersectionQuery) -> Result<Vec<GeocodeResult>> {
        self.intersections
            .search(query)?
            .into_iter()
            .map(|record| self.locate(record))
            .collect()
    }

    /// Resolve many inputs in parallel. Each input succeeds or fails on its own.
    ///
    /// Both tables are loaded before the fan-out; only a failed load fails
    /// the whole call.
    #[instrument(name = "Bulk Geocode", level = "info", skip_all, fields(inputs = inputs.len()))]
    pub fn geocode_bulk<S>(
        &self,
        parser: &dyn LocationParser,
        inputs: &[S],
    ) -> Result<Vec<Result<Vec<GeocodeResult>>>>
    where
        S: AsRef<str> + Sync,
    {
        // A table load run from inside a rayon worker can block that worker
        // on its own OnceCell while polars steals the next job.
        self.dataset.warm_up()?;
        Ok(inputs
            .par_iter()
            .map(|raw| self.geocode(parser, raw.as_ref()))
            .collect())
    }

    fn locate(&self, record: IntersectionRecord) -> Result<GeocodeResult> {
        let representation = self.geometry.to_text(&record.location)?;
        let point = parse_point(&representation)?;
        Ok(GeocodeResult {
            feature: MatchedFeature::Intersection(record),
            x: point.x(),
            y: point.y(),
            representation,
            interpolation: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::GeocodingError, parse::ParsingError};
    use curbside_data::test_data::{sample_blocks, sample_intersections};

    fn geocoder(config: &GeocoderConfig) -> Geocoder {
        let dataset =
            DatasetHandle::from_frames(sample_blocks().unwrap(), sample_intersections().unwrap());
        Geocoder::new(Arc::new(dataset), config).unwrap()
    }

    /// Reads "<number> <street>" or "<street> & <street>".
    struct SimpleParser;

    impl LocationParser for SimpleParser {
        fn parse(&self, normalized: &str) -> std::result::Result<ParsedLocation, ParsingError> {
            if let Some((a, b)) = normalized.split_once(" & ") {
                return Ok(ParsedLocation::Intersection(IntersectionQuery::streets(a, b)));
            }
            let (number, street) = normalized
                .split_once(' ')
                .ok_or_else(|| ParsingError::new(normalized, "expected a number and a street"))?;
            let query = AddressQuery::builder(street)
                .try_number(number)?
                .build()
                .map_err(|e| ParsingError::new(normalized, e.to_string()))?;
            Ok(ParsedLocation::Address(query))
        }
    }

    #[test]
    fn test_geocode_dispatches_on_parse() {
        let geocoder = geocoder(&GeocoderConfig::default());

        let results = geocoder.geocode(&SimpleParser, "  25   tobin ").unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_block());

        let results = geocoder.geocode(&SimpleParser, "oak & main").unwrap();
        assert_eq!(results.len(), 1);
        assert!(!results[0].is_block());
        assert!((results[0].x - -71.085).abs() < 1e-9);
        assert!((results[0].y - 42.362).abs() < 1e-9);
    }

    #[test]
    fn test_parse_errors_pass_through() {
        let geocoder = geocoder(&GeocoderConfig::default());
        let err = geocoder.geocode(&SimpleParser, "nonsense").unwrap_err();
        match err {
            GeocodingError::Parsing(e) => assert_eq!(e.input, "NONSENSE"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_forgiving_config_corrects_street_names() {
        let config = crate::GeocoderConfigBuilder::forgiving().build();
        let geocoder = geocoder(&config);
        let query = AddressQuery::builder("Tobbin").number(25).build().unwrap();
        assert_eq!(geocoder.geocode_address(&query).unwrap().len(), 1);

        let strict = geocoder_strict();
        assert!(strict.geocode_address(&query).unwrap().is_empty());
    }

    fn geocoder_strict() -> Geocoder {
        geocoder(&crate::GeocoderConfigBuilder::strict().build())
    }

    #[test]
    fn test_bulk_keeps_input_order() {
        let geocoder = geocoder(&GeocoderConfig::default());
        let results = geocoder
            .geocode_bulk(&SimpleParser, &["25 Tobin", "bad", "Oak & Elm"])
            .unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap()[0].id(), 1);
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap()[0].id(), 5);
    }

    #[test]
    fn test_bulk_on_cold_dataset() {
        let dataset = Arc::new(DatasetHandle::from_frames(
            sample_blocks().unwrap(),
            sample_intersections().unwrap(),
        ));
        let geocoder = Geocoder::new(Arc::clone(&dataset), &GeocoderConfig::default()).unwrap();
        assert!(!dataset.is_loaded(curbside_data::Table::Blocks));

        let inputs = ["25 Tobin", "151 Main", "40 Tobin", "250 Main"];
        let results = geocoder.geocode_bulk(&SimpleParser, &inputs).unwrap();

        let ids: Vec<Vec<i64>> = results
            .into_iter()
            .map(|r| r.unwrap().iter().map(GeocodeResult::id).collect())
            .collect();
        assert_eq!(ids, vec![vec![1], vec![2], vec![1], vec![3]]);
        assert!(dataset.is_loaded(curbside_data::Table::Intersections));
    }
}
