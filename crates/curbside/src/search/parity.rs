//! House-number parity reconciliation for street segments.
//!
//! A segment carries three ranges: the overall one spanning both sides, and
//! one per side. Sides usually hold a single parity each (odd on the left,
//! even on the right), so the number's parity picks the side whose range is
//! tested. When the sides cannot be told apart by parity the overall range
//! is used.

use std::fmt;

/// Which of a segment's ranges a number was tested against.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeSide {
    Overall,
    Left,
    Right,
}

impl fmt::Display for RangeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self {
            Self::Overall => "overall",
            Self::Left => "left",
            Self::Right => "right",
        };
        f.write_str(side)
    }
}

/// A closed house-number interval `[from_num, to_num]` as stored in the dataset.
///
/// Bounds may be missing, and `from_num` is not guaranteed to be the smaller one.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NumberRange {
    pub from_num: Option<i64>,
    pub to_num: Option<i64>,
}

impl NumberRange {
    #[must_use]
    pub const fn new(from_num: Option<i64>, to_num: Option<i64>) -> Self {
        Self { from_num, to_num }
    }

    #[must_use]
    pub const fn bounded(from_num: i64, to_num: i64) -> Self {
        Self::new(Some(from_num), Some(to_num))
    }

    /// Whether the range starts at a real house number. A stored `0` means unset.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self.from_num, Some(n) if n != 0)
    }

    /// Literal `from_num <= number <= to_num`. Missing bounds contain nothing.
    #[must_use]
    pub fn contains(&self, number: i64) -> bool {
        match (self.from_num, self.to_num) {
            (Some(from), Some(to)) => from <= number && number <= to,
            _ => false,
        }
    }

    /// Both bounds are set. Unlike [`Self::is_present`], a stored `0` counts.
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        self.from_num.is_some() && self.to_num.is_some()
    }

    /// The parity shared by both bounds, if they share one.
    fn fixed_parity(&self) -> Option<i64> {
        let from = parity(self.from_num?);
        (from == parity(self.to_num?)).then_some(from)
    }
}

impl fmt::Display for NumberRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |n: Option<i64>| n.map_or_else(|| "?".to_string(), |n| n.to_string());
        write!(f, "{}-{}", bound(self.from_num), bound(self.to_num))
    }
}

/// Outcome of testing a number against a segment.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Containment {
    pub matches: bool,
    /// The range actually used, needed for interpolation.
    pub range: NumberRange,
    pub side: RangeSide,
}

impl Containment {
    const fn new(matches: bool, range: NumberRange, side: RangeSide) -> Self {
        Self {
            matches,
            range,
            side,
        }
    }
}

/// The three house-number ranges of one street segment.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentRanges {
    pub overall: NumberRange,
    pub left: NumberRange,
    pub right: NumberRange,
}

const fn parity(n: i64) -> i64 {
    n.rem_euclid(2)
}

fn parity_of(n: Option<i64>) -> Option<i64> {
    n.map(parity)
}

impl SegmentRanges {
    #[must_use]
    pub const fn new(overall: NumberRange, left: NumberRange, right: NumberRange) -> Self {
        Self {
            overall,
            left,
            right,
        }
    }

    /// Decide whether `number` lies on this segment and which range applies.
    ///
    /// Without a number (or with `0`) the segment always matches on its
    /// overall range. Branches are tried in order:
    ///
    /// 1. Both sides present: if the sides share a parity at either boundary
    ///    the overall range is used, else the side whose `from_num` parity
    ///    equals the number's parity, else the right side.
    /// 2. Only the left side present: a left range of a single parity
    ///    different from the number's fails at once. Otherwise the right
    ///    range takes over when both its bounds are set, and fails the same
    ///    way on a single, different parity. A right range missing a bound
    ///    leaves the left range in use.
    ///
    /// The chosen range is then tested literally, without reordering bounds.
    #[must_use]
    pub fn contains_number(&self, number: Option<i64>) -> Containment {
        let number = match number {
            Some(n) if n != 0 => n,
            _ => return Containment::new(true, self.overall, RangeSide::Overall),
        };
        let number_parity = parity(number);

        let (range, side) = if self.left.is_present() && self.right.is_present() {
            let left_parity = parity_of(self.left.from_num);
            let shared_boundary = parity_of(self.right.to_num) == left_parity
                || parity_of(self.left.to_num) == parity_of(self.right.from_num);
            if shared_boundary {
                (self.overall, RangeSide::Overall)
            } else if left_parity == Some(number_parity) {
                (self.left, RangeSide::Left)
            } else {
                (self.right, RangeSide::Right)
            }
        } else if self.left.is_present() {
            let mismatched = |range: &NumberRange| {
                range
                    .fixed_parity()
                    .is_some_and(|fixed| fixed != number_parity)
            };
            if mismatched(&self.left) {
                return Containment::new(false, self.left, RangeSide::Left);
            }
            if self.right.is_bounded() {
                if mismatched(&self.right) {
                    return Containment::new(false, self.right, RangeSide::Right);
                }
                (self.right, RangeSide::Right)
            } else {
                (self.left, RangeSide::Left)
            }
        } else {
            (self.overall, RangeSide::Overall)
        };

        Containment::new(range.contains(number), range, side)
    }
}
