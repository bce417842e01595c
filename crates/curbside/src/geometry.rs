//! Geometry text handling and interpolation along street segments.
//!
//! Geometries travel as (E)WKT text: `SRID=4326;LINESTRING(x y, x y, ...)` for
//! blocks and `SRID=4326;POINT(x y)` for intersections. A [`GeometryProvider`]
//! turns stored geometries into text and interpolates points along lines;
//! [`parse_point`] decodes the point text it returns.

use geo::{Coord, LineString, Point};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EWKT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*(?:SRID=(\d+)\s*;)?\s*(POINT|LINESTRING)\s*\((.*)\)\s*$")
        .expect("EWKT pattern is valid")
});

/// A point representation that could not be decoded into coordinates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("String '{representation}' could not be parsed into points.")]
pub struct PointParsingError {
    pub representation: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Unsupported or malformed geometry: {0}")]
    Unsupported(String),
    #[error("Invalid coordinate '{0}'")]
    InvalidCoordinate(String),
    #[error("Interpolation fraction {0} is outside [0, 1]")]
    FractionOutOfRange(f64),
}

/// Geometry operations the searchers need from the outside world.
///
/// [`PlanarGeometry`] covers (E)WKT stored in the tables. A spatial database
/// can be plugged in instead by implementing this trait.
pub trait GeometryProvider: Send + Sync {
    /// Text representation of a stored geometry.
    fn to_text(&self, geometry: &str) -> anyhow::Result<String>;

    /// The point at `fraction` (0 = start, 1 = end) along a linear geometry, as text.
    fn interpolate(&self, geometry: &str, fraction: f64) -> anyhow::Result<String>;
}

enum Kind {
    Point,
    LineString,
}

struct Ewkt<'a> {
    srid: Option<&'a str>,
    kind: Kind,
    body: &'a str,
}

fn split_ewkt(text: &str) -> Option<Ewkt<'_>> {
    let caps = EWKT_RE.captures(text)?;
    let kind = if caps[2].eq_ignore_ascii_case("POINT") {
        Kind::Point
    } else {
        Kind::LineString
    };
    Some(Ewkt {
        srid: caps.get(1).map(|m| m.as_str()),
        kind,
        body: caps.get(3)?.as_str(),
    })
}

fn parse_coord(pair: &str) -> Option<Coord<f64>> {
    let mut parts = pair.split_whitespace();
    let x = parts.next()?.parse::<f64>().ok()?;
    let y = parts.next()?.parse::<f64>().ok()?;
    // A trailing Z or M ordinate is ignored.
    (x.is_finite() && y.is_finite()).then_some(Coord { x, y })
}

/// Decode `POINT(x y)` or `SRID=n;POINT(x y)` into a point.
pub fn parse_point(representation: &str) -> Result<Point<f64>, PointParsingError> {
    let err = || PointParsingError {
        representation: representation.to_string(),
    };
    match split_ewkt(representation) {
        Some(Ewkt {
            kind: Kind::Point,
            body,
            ..
        }) => parse_coord(body).map(Point::from).ok_or_else(err),
        _ => Err(err()),
    }
}

/// Decode a (E)WKT linestring, returning its SRID when one is given.
pub fn parse_linestring(
    representation: &str,
) -> Result<(Option<u32>, LineString<f64>), GeometryError> {
    let unsupported = || GeometryError::Unsupported(representation.to_string());
    let Some(Ewkt {
        srid,
        kind: Kind::LineString,
        body,
    }) = split_ewkt(representation)
    else {
        return Err(unsupported());
    };
    let coords = body
        .split(',')
        .map(|pair| {
            parse_coord(pair).ok_or_else(|| GeometryError::InvalidCoordinate(pair.trim().to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let srid = srid.map(str::parse::<u32>).transpose().map_err(|_| unsupported())?;
    Ok((srid, LineString::new(coords)))
}

/// Walk `fraction` of the planar length of `line`.
///
/// Zero-length lines resolve to their first vertex.
pub fn interpolate_along(line: &LineString<f64>, fraction: f64) -> Option<Point<f64>> {
    let first = *line.0.first()?;
    let lengths: Vec<f64> = line.lines().map(|l| l.dx().hypot(l.dy())).collect();
    let total: f64 = lengths.iter().sum();
    if total <= 0.0 {
        return Some(Point::from(first));
    }

    let mut remaining = fraction * total;
    for (segment, length) in line.lines().zip(lengths) {
        if remaining <= length {
            let t = if length > 0.0 { remaining / length } else { 0.0 };
            return Some(Point::new(
                t.mul_add(segment.dx(), segment.start.x),
                t.mul_add(segment.dy(), segment.start.y),
            ));
        }
        remaining -= length;
    }
    line.0.last().copied().map(Point::from)
}

pub(crate) fn format_point(srid: Option<u32>, point: Point<f64>) -> String {
    match srid {
        Some(srid) => format!("SRID={srid};POINT({} {})", point.x(), point.y()),
        None => format!("POINT({} {})", point.x(), point.y()),
    }
}

/// Interpolates in the plane of the stored coordinates.
///
/// Good enough along a single block, where the earth's curvature does not
/// matter. The SRID of the input, if any, is carried onto the output point.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarGeometry;

impl GeometryProvider for PlanarGeometry {
    fn to_text(&self, geometry: &str) -> anyhow::Result<String> {
        Ok(geometry.trim().to_string())
    }

    fn interpolate(&self, geometry: &str, fraction: f64) -> anyhow::Result<String> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(GeometryError::FractionOutOfRange(fraction).into());
        }
        let (srid, line) = parse_linestring(geometry)?;
        let point = interpolate_along(&line, fraction)
            .ok_or_else(|| GeometryError::Unsupported(geometry.to_string()))?;
        Ok(format_point(srid, point))
    }
}
