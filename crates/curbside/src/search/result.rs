use geo::Point;

use super::{
    block::StreetSegmentRecord,
    intersection::IntersectionRecord,
    parity::{NumberRange, RangeSide},
};

/// The record a result points at.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum MatchedFeature {
    Block(StreetSegmentRecord),
    Intersection(IntersectionRecord),
}

/// How a block result's point was placed along its segment.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolation {
    /// Position along the segment, 0 at its start and 1 at its end.
    pub fraction: f64,
    pub range: NumberRange,
    pub side: RangeSide,
}

/// A resolved location.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub feature: MatchedFeature,
    pub x: f64,
    pub y: f64,
    /// Point text as returned by the geometry provider or stored in the table.
    pub representation: String,
    /// Present for block results only.
    pub interpolation: Option<Interpolation>,
}

impl GeocodeResult {
    #[must_use]
    pub fn point(&self) -> Point<f64> {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub const fn id(&self) -> i64 {
        match &self.feature {
            MatchedFeature::Block(block) => block.id,
            MatchedFeature::Intersection(intersection) => intersection.id,
        }
    }

    #[must_use]
    pub fn pretty_name(&self) -> Option<&str> {
        match &self.feature {
            MatchedFeature::Block(block) => block.pretty_name.as_deref(),
            MatchedFeature::Intersection(intersection) => intersection.pretty_name.as_deref(),
        }
    }

    #[must_use]
    pub fn fraction(&self) -> Option<f64> {
        self.interpolation.map(|i| i.fraction)
    }

    #[must_use]
    pub const fn is_block(&self) -> bool {
        matches!(self.feature, MatchedFeature::Block(_))
    }
}
