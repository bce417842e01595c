//! Integration tests for curbside address and intersection resolution
//!
//! These run against the public API using the sample tables shipped with
//! `curbside-data`, both in memory and written to a temporary directory.

use std::sync::Arc;

use curbside::{
    AddressQuery, BlockSearcher, DatasetFormat, DatasetHandle, DatasetSource, Geocoder,
    GeocoderConfig, GeocoderConfigBuilder, GeometryProvider, IntersectionDescriptor,
    IntersectionQuery, IntersectionSearcher, LocationParser, MatchedFeature, NumberRange,
    ParsedLocation, ParsingError, PlanarGeometry, RangeSide, error::GeocodingError,
};
use curbside_data::test_data::{sample_blocks, sample_intersections, write_sample_dataset};

fn setup_test_env() {
    let _ = curbside::init_logging(tracing::Level::WARN);
}

fn sample_dataset() -> Arc<DatasetHandle> {
    Arc::new(DatasetHandle::from_frames(
        sample_blocks().expect("sample blocks"),
        sample_intersections().expect("sample intersections"),
    ))
}

fn block_ids(results: &[curbside::GeocodeResult]) -> Vec<i64> {
    results.iter().map(curbside::GeocodeResult::id).collect()
}

/// Planar interpolation, except for one block whose point text is garbage.
struct BrokenForBlock {
    geometry: String,
}

impl GeometryProvider for BrokenForBlock {
    fn to_text(&self, geometry: &str) -> anyhow::Result<String> {
        PlanarGeometry.to_text(geometry)
    }

    fn interpolate(&self, geometry: &str, fraction: f64) -> anyhow::Result<String> {
        if geometry == self.geometry {
            Ok("POINT(not a point)".to_string())
        } else {
            PlanarGeometry.interpolate(geometry, fraction)
        }
    }
}

fn broken_main_st_200() -> Arc<dyn GeometryProvider> {
    let blocks = sample_blocks().unwrap();
    let geometry = blocks
        .column(curbside_data::schema::blocks::GEOM)
        .unwrap()
        .str()
        .unwrap()
        .get(2)
        .unwrap()
        .to_string();
    Arc::new(BrokenForBlock { geometry })
}

#[test]
fn test_odd_number_on_left_side() {
    setup_test_env();

    let searcher = BlockSearcher::new(sample_dataset());
    let query = AddressQuery::builder("Tobin").number(25).build().unwrap();
    let results = searcher.search(&query).expect("Search should work");

    assert_eq!(block_ids(&results), vec![1]);
    let interpolation = results[0].interpolation.expect("block result");
    assert_eq!(interpolation.side, RangeSide::Left);
    assert_eq!(interpolation.range, NumberRange::bounded(1, 99));
    assert!((interpolation.fraction - 24.0 / 98.0).abs() < 1e-12);

    // LINESTRING(-71.105 42.31, -71.1 42.315), 24/98 of the way along.
    let expected_x = -71.105 + 0.005 * 24.0 / 98.0;
    let expected_y = 42.31 + 0.005 * 24.0 / 98.0;
    assert!((results[0].x - expected_x).abs() < 1e-9);
    assert!((results[0].y - expected_y).abs() < 1e-9);
    assert!(results[0].representation.starts_with("SRID=4326;POINT("));
}

#[test]
fn test_no_number_returns_every_segment_at_midpoint() {
    setup_test_env();

    let searcher = BlockSearcher::new(sample_dataset());
    let query = AddressQuery::builder("MAIN").build().unwrap();
    let results = searcher.search(&query).unwrap();

    assert_eq!(block_ids(&results), vec![2, 3, 4, 6]);
    for result in &results {
        let interpolation = result.interpolation.unwrap();
        assert!((interpolation.fraction - 0.5).abs() < f64::EPSILON);
        assert_eq!(interpolation.side, RangeSide::Overall);
    }

    // Block 2 bends at its middle vertex.
    assert!((results[0].x - -71.085).abs() < 1e-9);
    assert!((results[0].y - 42.362).abs() < 1e-9);
}

#[test]
fn test_single_street_intersection_matches_either_side() {
    setup_test_env();

    let searcher = IntersectionSearcher::new(sample_dataset());
    let query = IntersectionQuery::new(
        IntersectionDescriptor::new("MALVERN"),
        IntersectionDescriptor::default(),
    );
    let records = searcher.search(&query).unwrap();
    let ids: Vec<_> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(records[0].location, "SRID=4326;POINT(-71.1185 42.351)");
}

#[test]
fn test_malformed_point_fails_search() {
    setup_test_env();

    let searcher = BlockSearcher::new(sample_dataset()).with_geometry(broken_main_st_200());
    let query = AddressQuery::builder("Main").build().unwrap();

    match searcher.search(&query) {
        Err(GeocodingError::PointParsing(e)) => {
            assert_eq!(e.representation, "POINT(not a point)");
        }
        other => panic!("expected a point parsing error, got {other:?}"),
    }
}

#[test]
fn test_malformed_point_does_not_hide_other_segments() {
    setup_test_env();

    let searcher = BlockSearcher::new(sample_dataset()).with_geometry(broken_main_st_200());
    let query = AddressQuery::builder("Main").build().unwrap();
    let (results, failures) = searcher.search_partitioned(&query).unwrap();

    assert_eq!(block_ids(&results), vec![2, 4, 6]);
    assert_eq!(failures.len(), 1);
    assert!(matches!(&failures[0], GeocodingError::PointParsing(_)));
}

#[test]
fn test_failing_geometry_provider_is_reported() {
    struct Offline;

    impl GeometryProvider for Offline {
        fn to_text(&self, _geometry: &str) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }

        fn interpolate(&self, _geometry: &str, _fraction: f64) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    setup_test_env();
    let geocoder = Geocoder::new(sample_dataset(), &GeocoderConfig::default())
        .unwrap()
        .with_geometry(Arc::new(Offline));

    let query = AddressQuery::builder("Tobin").number(25).build().unwrap();
    assert!(matches!(
        geocoder.geocode_address(&query),
        Err(GeocodingError::GeometryProvider(_))
    ));
    assert!(matches!(
        geocoder.geocode_intersection(&IntersectionQuery::streets("Oak", "Elm")),
        Err(GeocodingError::GeometryProvider(_))
    ));
}

#[test]
fn test_intersection_symmetry() {
    setup_test_env();

    let geocoder = Geocoder::new(sample_dataset(), &GeocoderConfig::default()).unwrap();
    let pairs = [
        ("Main", "Oak"),
        ("Pleasant", "Malvern"),
        ("Elm", "Main"),
        ("Commonwealth", "Malvern"),
        ("Oak", "Nowhere"),
    ];
    for (x, y) in pairs {
        let forward = geocoder
            .geocode_intersection(&IntersectionQuery::streets(x, y))
            .unwrap();
        let backward = geocoder
            .geocode_intersection(&IntersectionQuery::streets(y, x))
            .unwrap();
        assert_eq!(forward, backward, "{x} & {y}");
    }
}

#[test]
fn test_intersection_result_carries_stored_point() {
    setup_test_env();

    let geocoder = Geocoder::new(sample_dataset(), &GeocoderConfig::default()).unwrap();
    let results = geocoder
        .geocode_intersection(&IntersectionQuery::streets("Commonwealth", "Malvern"))
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].interpolation.is_none());
    assert!((results[0].x - -71.1185).abs() < 1e-9);
    assert!((results[0].y - 42.351).abs() < 1e-9);
    match &results[0].feature {
        MatchedFeature::Intersection(record) => {
            assert_eq!(record.a.street.as_deref(), Some("MALVERN"));
        }
        MatchedFeature::Block(_) => panic!("expected an intersection"),
    }
}

#[test]
fn test_identity_lookups() {
    setup_test_env();

    let dataset = sample_dataset();
    let blocks = BlockSearcher::new(Arc::clone(&dataset));
    let intersections = IntersectionSearcher::new(dataset);

    assert_eq!(blocks.get(1).unwrap().street, "TOBIN");
    assert_eq!(intersections.get(2).unwrap().pretty_name.as_deref(), Some("PLEASANT ST & MALVERN ST"));
    assert!(matches!(blocks.get(0), Err(GeocodingError::DoesNotExist { .. })));
    assert!(matches!(
        intersections.get(-1),
        Err(GeocodingError::DoesNotExist { .. })
    ));

    // A filtered search that finds nothing is not an error.
    let query = AddressQuery::builder("Tobin").number(1000).build().unwrap();
    assert!(blocks.search(&query).unwrap().is_empty());
}

#[test]
fn test_left_only_segment() {
    setup_test_env();

    let searcher = BlockSearcher::new(sample_dataset());
    let odd = AddressQuery::builder("Main").number(351).build().unwrap();
    let results = searcher.search(&odd).unwrap();
    assert_eq!(block_ids(&results), vec![6]);
    assert!((results[0].fraction().unwrap() - 50.0 / 98.0).abs() < 1e-12);

    let even = AddressQuery::builder("Main").number(350).build().unwrap();
    assert!(searcher.search(&even).unwrap().is_empty());
}

#[test]
fn test_single_number_range_uses_midpoint() {
    setup_test_env();

    let searcher = BlockSearcher::new(sample_dataset());
    let query = AddressQuery::builder("Elm").number(50).build().unwrap();
    let results = searcher.search(&query).unwrap();
    assert_eq!(block_ids(&results), vec![7]);
    let interpolation = results[0].interpolation.unwrap();
    assert_eq!(interpolation.range, NumberRange::bounded(50, 50));
    assert!((interpolation.fraction - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_mixed_parity_sides_use_overall_range() {
    setup_test_env();

    let searcher = BlockSearcher::new(sample_dataset());
    let query = AddressQuery::builder("Vassar").number(50).build().unwrap();
    let results = searcher.search(&query).unwrap();
    let interpolation = results[0].interpolation.unwrap();
    assert_eq!(interpolation.side, RangeSide::Overall);
    assert!((interpolation.fraction - 49.0 / 98.0).abs() < 1e-12);
}

/// "<number> <street>[, <city>]" or "<street> & <street>".
struct CommaParser;

impl LocationParser for CommaParser {
    fn parse(&self, normalized: &str) -> Result<ParsedLocation, ParsingError> {
        if let Some((a, b)) = normalized.split_once(" & ") {
            return Ok(ParsedLocation::Intersection(IntersectionQuery::streets(a, b)));
        }
        let (address, city) = normalized.split_once(", ").unwrap_or((normalized, ""));
        let (number, street) = address
            .split_once(' ')
            .ok_or_else(|| ParsingError::new(normalized, "missing street"))?;
        AddressQuery::builder(street)
            .try_number(number)?
            .city(city)
            .build()
            .map(ParsedLocation::Address)
            .map_err(|e| ParsingError::new(normalized, e.to_string()))
    }
}

#[test]
fn test_geocode_with_parser() {
    setup_test_env();

    let geocoder = Geocoder::new(sample_dataset(), &GeocoderConfig::default()).unwrap();

    let results = geocoder.geocode(&CommaParser, "250 main, somerville").unwrap();
    assert_eq!(block_ids(&results), vec![3]);

    let err = geocoder.geocode(&CommaParser, "main").unwrap_err();
    assert!(matches!(err, GeocodingError::Parsing(ref e) if e.reason == "missing street"));
    assert_eq!(err.to_string(), "Could not parse 'MAIN': missing street");
}

#[test]
fn test_bulk_geocoding() {
    setup_test_env();

    let geocoder = Geocoder::new(sample_dataset(), &GeocoderConfig::default()).unwrap();
    let inputs = vec![
        "25 Tobin".to_string(),
        "oak & elm".to_string(),
        "x".to_string(),
        "151 Main".to_string(),
    ];
    let results = geocoder.geocode_bulk(&CommaParser, &inputs).unwrap();

    assert_eq!(results.len(), 4);
    assert_eq!(block_ids(results[0].as_ref().unwrap()), vec![1]);
    assert_eq!(block_ids(results[1].as_ref().unwrap()), vec![5]);
    assert!(matches!(results[2], Err(GeocodingError::Parsing(_))));
    assert_eq!(block_ids(results[3].as_ref().unwrap()), vec![2]);
}

#[test]
fn test_spelling_correction() {
    setup_test_env();

    let config = GeocoderConfigBuilder::forgiving().build();
    let geocoder = Geocoder::new(sample_dataset(), &config).unwrap();

    let query = AddressQuery::builder("Vasar").number(10).build().unwrap();
    assert_eq!(block_ids(&geocoder.geocode_address(&query).unwrap()), vec![5]);

    let results = geocoder
        .geocode_intersection(&IntersectionQuery::streets("Malvren", "Pleasent"))
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id(), 2);
}

#[test]
fn test_on_disk_datasets() {
    setup_test_env();

    for format in [DatasetFormat::Parquet, DatasetFormat::Csv] {
        let dir = tempfile::tempdir().unwrap();
        write_sample_dataset(dir.path(), format).unwrap();

        let dataset = Arc::new(DatasetHandle::new(DatasetSource::directory(dir.path(), format)));
        let config = GeocoderConfigBuilder::strict().build();
        let geocoder = Geocoder::new(Arc::clone(&dataset), &config).unwrap();

        let query = AddressQuery::builder("Tobin")
            .number(25)
            .postal_code("02130")
            .build()
            .unwrap();
        let results = geocoder.geocode_address(&query).unwrap();
        assert_eq!(block_ids(&results), vec![1], "{format:?}");

        let corners = geocoder
            .geocode_intersection(&IntersectionQuery::streets("Elm", "N Main"))
            .unwrap();
        assert!(corners.is_empty(), "{format:?}");
        let corners = geocoder
            .geocode_intersection(&IntersectionQuery::new(
                IntersectionDescriptor::new("Elm"),
                IntersectionDescriptor::new("Main").with_pre_dir("N"),
            ))
            .unwrap();
        assert_eq!(corners.len(), 1, "{format:?}");
    }
}

#[test]
fn test_missing_dataset_is_fatal() {
    setup_test_env();

    let dir = tempfile::tempdir().unwrap();
    let dataset = Arc::new(DatasetHandle::new(DatasetSource::directory(
        dir.path().join("absent"),
        DatasetFormat::Parquet,
    )));
    let searcher = BlockSearcher::new(dataset);
    let query = AddressQuery::builder("Tobin").build().unwrap();
    assert!(matches!(
        searcher.search(&query),
        Err(GeocodingError::Dataset(_))
    ));
}

#[test]
fn test_concurrent_searches_share_one_dataset() {
    setup_test_env();

    let geocoder = Geocoder::new(sample_dataset(), &GeocoderConfig::default()).unwrap();
    std::thread::scope(|scope| {
        for number in [1, 25, 49, 77, 99] {
            let geocoder = &geocoder;
            scope.spawn(move || {
                let query = AddressQuery::builder("Tobin").number(number).build().unwrap();
                let results = geocoder.geocode_address(&query).unwrap();
                assert_eq!(block_ids(&results), vec![1]);
            });
        }
    });
}
