//! Column layout of the reference tables.
//!
//! Text columns are stored upper-cased by the dataset; geometry columns hold
//! (E)WKT text such as `SRID=4326;LINESTRING(-71.1 42.3, -71.0 42.4)`.

use polars::prelude::*;

/// Columns of the `blocks` table.
pub mod blocks {
    pub const ID: &str = "id";
    pub const PRETTY_NAME: &str = "pretty_name";
    pub const STREET: &str = "street";
    pub const PREDIR: &str = "predir";
    pub const SUFFIX: &str = "suffix";
    pub const POSTDIR: &str = "postdir";
    pub const FROM_NUM: &str = "from_num";
    pub const TO_NUM: &str = "to_num";
    pub const LEFT_FROM_NUM: &str = "left_from_num";
    pub const LEFT_TO_NUM: &str = "left_to_num";
    pub const RIGHT_FROM_NUM: &str = "right_from_num";
    pub const RIGHT_TO_NUM: &str = "right_to_num";
    pub const LEFT_CITY: &str = "left_city";
    pub const RIGHT_CITY: &str = "right_city";
    pub const LEFT_STATE: &str = "left_state";
    pub const RIGHT_STATE: &str = "right_state";
    pub const LEFT_ZIP: &str = "left_zip";
    pub const RIGHT_ZIP: &str = "right_zip";
    pub const GEOM: &str = "geom";
}

/// Columns of the `intersections` table.
pub mod intersections {
    pub const ID: &str = "id";
    pub const PRETTY_NAME: &str = "pretty_name";
    pub const PREDIR_A: &str = "predir_a";
    pub const STREET_A: &str = "street_a";
    pub const SUFFIX_A: &str = "suffix_a";
    pub const POSTDIR_A: &str = "postdir_a";
    pub const PREDIR_B: &str = "predir_b";
    pub const STREET_B: &str = "street_b";
    pub const SUFFIX_B: &str = "suffix_b";
    pub const POSTDIR_B: &str = "postdir_b";
    pub const LOCATION: &str = "location";
}

pub static BLOCKS_SCHEMA: [(PlSmallStr, DataType); 19] = [
    (PlSmallStr::from_static(blocks::ID), DataType::Int64),
    (PlSmallStr::from_static(blocks::PRETTY_NAME), DataType::String),
    (PlSmallStr::from_static(blocks::STREET), DataType::String),
    (PlSmallStr::from_static(blocks::PREDIR), DataType::String),
    (PlSmallStr::from_static(blocks::SUFFIX), DataType::String),
    (PlSmallStr::from_static(blocks::POSTDIR), DataType::String),
    (PlSmallStr::from_static(blocks::FROM_NUM), DataType::Int64),
    (PlSmallStr::from_static(blocks::TO_NUM), DataType::Int64),
    (PlSmallStr::from_static(blocks::LEFT_FROM_NUM), DataType::Int64),
    (PlSmallStr::from_static(blocks::LEFT_TO_NUM), DataType::Int64),
    (PlSmallStr::from_static(blocks::RIGHT_FROM_NUM), DataType::Int64),
    (PlSmallStr::from_static(blocks::RIGHT_TO_NUM), DataType::Int64),
    (PlSmallStr::from_static(blocks::LEFT_CITY), DataType::String),
    (PlSmallStr::from_static(blocks::RIGHT_CITY), DataType::String),
    (PlSmallStr::from_static(blocks::LEFT_STATE), DataType::String),
    (PlSmallStr::from_static(blocks::RIGHT_STATE), DataType::String),
    (PlSmallStr::from_static(blocks::LEFT_ZIP), DataType::String),
    (PlSmallStr::from_static(blocks::RIGHT_ZIP), DataType::String),
    (PlSmallStr::from_static(blocks::GEOM), DataType::String),
];

pub static INTERSECTIONS_SCHEMA: [(PlSmallStr, DataType); 11] = [
    (PlSmallStr::from_static(intersections::ID), DataType::Int64),
    (PlSmallStr::from_static(intersections::PRETTY_NAME), DataType::String),
    (PlSmallStr::from_static(intersections::PREDIR_A), DataType::String),
    (PlSmallStr::from_static(intersections::STREET_A), DataType::String),
    (PlSmallStr::from_static(intersections::SUFFIX_A), DataType::String),
    (PlSmallStr::from_static(intersections::POSTDIR_A), DataType::String),
    (PlSmallStr::from_static(intersections::PREDIR_B), DataType::String),
    (PlSmallStr::from_static(intersections::STREET_B), DataType::String),
    (PlSmallStr::from_static(intersections::SUFFIX_B), DataType::String),
    (PlSmallStr::from_static(intersections::POSTDIR_B), DataType::String),
    (PlSmallStr::from_static(intersections::LOCATION), DataType::String),
];
