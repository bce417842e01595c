//! Small, hand-checked sample tables.
//!
//! The blocks cover the interesting parity layouts: parity-separable sides
//! (TOBIN, MAIN), mixed parity at the boundary (VASSAR), a left-only segment
//! (MAIN 300-399), a single-number block (ELM) and a segment without side
//! ranges (OAK). Two MAIN blocks straddle the Cambridge/Somerville line.

use std::{fs::File, path::Path};

use polars::prelude::*;
use tracing::info;

use crate::{
    error::Result,
    schema::{blocks as b, intersections as i},
    tables::{DatasetFormat, Table},
};

/// Sample `blocks` table.
pub fn sample_blocks() -> Result<DataFrame> {
    Ok(df![
        b::ID => [1i64, 2, 3, 4, 5, 6, 7, 8],
        b::PRETTY_NAME => [
            "TOBIN CT 1-99",
            "MAIN ST 100-199",
            "MAIN ST 200-299",
            "N MAIN AVE 1-49",
            "VASSAR ST 1-99",
            "MAIN ST 300-399",
            "ELM ST 50",
            "OAK ST 1-99",
        ],
        b::STREET => ["TOBIN", "MAIN", "MAIN", "MAIN", "VASSAR", "MAIN", "ELM", "OAK"],
        b::PREDIR => [None, None, None, Some("N"), None, None, None, None],
        b::SUFFIX => ["CT", "ST", "ST", "AVE", "ST", "ST", "ST", "ST"],
        b::POSTDIR => [None::<&str>, None, None, None, None, None, None, None],
        b::FROM_NUM => [1i64, 100, 200, 1, 1, 300, 50, 1],
        b::TO_NUM => [99i64, 199, 299, 49, 99, 399, 50, 99],
        b::LEFT_FROM_NUM => [Some(1i64), Some(101), Some(201), Some(1), Some(1), Some(301), Some(50), None],
        b::LEFT_TO_NUM => [Some(99i64), Some(199), Some(299), Some(49), Some(98), Some(399), Some(50), None],
        b::RIGHT_FROM_NUM => [Some(2i64), Some(100), Some(200), Some(2), Some(2), None, Some(51), None],
        b::RIGHT_TO_NUM => [Some(98i64), Some(198), Some(298), Some(48), Some(99), None, Some(51), None],
        b::LEFT_CITY => ["BOSTON", "CAMBRIDGE", "CAMBRIDGE", "MEDFORD", "CAMBRIDGE", "CAMBRIDGE", "CAMBRIDGE", "CAMBRIDGE"],
        b::RIGHT_CITY => ["BOSTON", "CAMBRIDGE", "SOMERVILLE", "MEDFORD", "CAMBRIDGE", "CAMBRIDGE", "CAMBRIDGE", "CAMBRIDGE"],
        b::LEFT_STATE => ["MA", "MA", "MA", "MA", "MA", "MA", "MA", "MA"],
        b::RIGHT_STATE => ["MA", "MA", "MA", "MA", "MA", "MA", "MA", "MA"],
        b::LEFT_ZIP => ["02130", "02139", "02139", "02155", "02139", "02139", "02139", "02139"],
        b::RIGHT_ZIP => ["02130", "02139", "02143", "02155", "02139", "02139", "02139", "02139"],
        b::GEOM => [
            "SRID=4326;LINESTRING(-71.105 42.31, -71.1 42.315)",
            "SRID=4326;LINESTRING(-71.09 42.36, -71.085 42.362, -71.08 42.364)",
            "SRID=4326;LINESTRING(-71.08 42.364, -71.07 42.368)",
            "SRID=4326;LINESTRING(-71.11 42.42, -71.11 42.43)",
            "SRID=4326;LINESTRING(-71.095 42.355, -71.1 42.36)",
            "SRID=4326;LINESTRING(-71.07 42.368, -71.06 42.372)",
            "SRID=4326;LINESTRING(-71.12 42.38, -71.118 42.381)",
            "SRID=4326;LINESTRING(-71.085 42.362, -71.085 42.37)",
        ],
    ]?)
}

/// Sample `intersections` table.
pub fn sample_intersections() -> Result<DataFrame> {
    Ok(df![
        i::ID => [1i64, 2, 3, 4, 5],
        i::PRETTY_NAME => [
            "MALVERN ST & COMMONWEALTH AVE",
            "PLEASANT ST & MALVERN ST",
            "MAIN ST & OAK ST",
            "N MAIN AVE & ELM ST",
            "OAK ST & ELM ST",
        ],
        i::PREDIR_A => [None, None, None, Some("N"), None],
        i::STREET_A => ["MALVERN", "PLEASANT", "MAIN", "MAIN", "OAK"],
        i::SUFFIX_A => ["ST", "ST", "ST", "AVE", "ST"],
        i::POSTDIR_A => [None::<&str>, None, None, None, None],
        i::PREDIR_B => [None::<&str>, None, None, None, None],
        i::STREET_B => ["COMMONWEALTH", "MALVERN", "OAK", "ELM", "ELM"],
        i::SUFFIX_B => ["AVE", "ST", "ST", "ST", "ST"],
        i::POSTDIR_B => [None::<&str>, None, None, None, None],
        i::LOCATION => [
            "SRID=4326;POINT(-71.1185 42.351)",
            "SRID=4326;POINT(-71.12 42.353)",
            "SRID=4326;POINT(-71.085 42.362)",
            "SRID=4326;POINT(-71.11 42.43)",
            "SRID=4326;POINT(-71.085 42.37)",
        ],
    ]?)
}

/// Write both tables into `dir` using the file names [`crate::DatasetHandle`] expects.
pub fn write_dataset(
    dir: &Path,
    format: DatasetFormat,
    blocks: &mut DataFrame,
    intersections: &mut DataFrame,
) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    for (table, df) in [(Table::Blocks, blocks), (Table::Intersections, intersections)] {
        let path = dir.join(table.file_name(format));
        let mut file = File::create(&path)?;
        match format {
            DatasetFormat::Parquet => {
                ParquetWriter::new(&mut file).finish(df)?;
            }
            DatasetFormat::Csv => {
                CsvWriter::new(&mut file).finish(df)?;
            }
        }
        info!(path = ?path.file_name(), rows = df.height(), "Wrote table");
    }
    Ok(())
}

/// Write the sample tables into `dir`.
pub fn write_sample_dataset(dir: &Path, format: DatasetFormat) -> Result<()> {
    write_dataset(
        dir,
        format,
        &mut sample_blocks()?,
        &mut sample_intersections()?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BLOCKS_SCHEMA, INTERSECTIONS_SCHEMA};
    use crate::tests_utils::*;

    #[test]
    fn test_sample_tables_carry_every_schema_column() {
        let blocks = sample_blocks().unwrap();
        let names: Vec<&str> = BLOCKS_SCHEMA.iter().map(|(n, _)| n.as_str()).collect();
        assert_has_columns(&blocks, &names);
        assert_eq!(blocks.height(), 8);

        let intersections = sample_intersections().unwrap();
        let names: Vec<&str> = INTERSECTIONS_SCHEMA
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_has_columns(&intersections, &names);
        assert_eq!(intersections.height(), 5);
    }

    #[test]
    fn test_left_only_block_has_null_right_range() {
        let blocks = sample_blocks().unwrap();
        let right_from = blocks.column(b::RIGHT_FROM_NUM).unwrap().i64().unwrap();
        assert_eq!(right_from.get(5), None);
        assert_eq!(right_from.get(0), Some(2));
    }

    #[test]
    fn test_write_sample_dataset_creates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_dataset(dir.path(), DatasetFormat::Csv).unwrap();
        assert!(dir.path().join("blocks.csv").exists());
        assert!(dir.path().join("intersections.csv").exists());
    }
}
