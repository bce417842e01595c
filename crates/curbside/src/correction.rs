//! Pluggable spelling correction of street names.

use ahash::AHashSet;
use curbside_data::schema::{blocks, intersections};
use polars::prelude::*;
use rapidfuzz::fuzz;
use tracing::{debug, info};

use crate::error::Result;
use curbside_data::DatasetHandle;

/// A token and its best-guess correction. Uncorrected tokens map to themselves.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub original: String,
    pub corrected: String,
}

impl Correction {
    pub fn unchanged(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            original: token.clone(),
            corrected: token,
        }
    }

    #[must_use]
    pub fn is_change(&self) -> bool {
        self.original != self.corrected
    }
}

/// Maps a token to its best-guess correction. Must never fail.
pub trait SpellingCorrector: Send + Sync {
    fn correct(&self, token: &str) -> Correction;
}

/// Leaves every token as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCorrection;

impl SpellingCorrector for NoCorrection {
    fn correct(&self, token: &str) -> Correction {
        Correction::unchanged(token)
    }
}

/// Snaps misspelled street names onto the closest known name.
///
/// Known names are compared upper-cased. A token that already names a known
/// street, or that scores below `min_similarity` against every known street,
/// comes back unchanged.
#[derive(Debug, Clone)]
pub struct StreetNameCorrector {
    known: AHashSet<String>,
    names: Vec<String>,
    min_similarity: f64,
}

impl StreetNameCorrector {
    pub fn new<I, S>(names: I, min_similarity: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let known: AHashSet<String> = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_uppercase())
            .filter(|name| !name.is_empty())
            .collect();
        let mut names: Vec<String> = known.iter().cloned().collect();
        names.sort_unstable();
        Self {
            known,
            names,
            min_similarity,
        }
    }

    /// Collect the street names of both tables.
    pub fn from_dataset(dataset: &DatasetHandle, min_similarity: f64) -> Result<Self> {
        let block_streets = dataset
            .blocks()?
            .select([col(blocks::STREET)])
            .collect()?;
        let intersection_streets = dataset
            .intersections()?
            .select([col(intersections::STREET_A), col(intersections::STREET_B)])
            .collect()?;

        let mut names = Vec::new();
        for column in block_streets
            .get_columns()
            .iter()
            .chain(intersection_streets.get_columns())
        {
            names.extend(column.str()?.into_iter().flatten().map(ToString::to_string));
        }
        let corrector = Self::new(names, min_similarity);
        info!(
            known_streets = corrector.len(),
            min_similarity, "Built street name corrector"
        );
        Ok(corrector)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl SpellingCorrector for StreetNameCorrector {
    fn correct(&self, token: &str) -> Correction {
        let candidate = token.trim().to_uppercase();
        if candidate.is_empty() || self.known.contains(&candidate) {
            return Correction::unchanged(token);
        }

        let best = self
            .names
            .iter()
            .map(|name| (name, fuzz::ratio(candidate.chars(), name.chars())))
            .filter(|(_, score)| *score >= self.min_similarity)
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(a.0)));

        match best {
            Some((name, score)) => {
                debug!(token, corrected = %name, score, "Street name corrected");
                Correction {
                    original: token.to_string(),
                    corrected: name.clone(),
                }
            }
            None => Correction::unchanged(token),
        }
    }
}

/// Run `token` through `corrector`, logging any change.
pub(crate) fn correct_token(corrector: &dyn SpellingCorrector, token: &str) -> String {
    let correction = corrector.correct(token);
    if correction.is_change() {
        info!(
            original = %correction.original,
            corrected = %correction.corrected,
            "Applying spelling correction"
        );
    }
    correction.corrected
}

#[cfg(test)]
mod tests {
    use super::*;
    use curbside_data::test_data::{sample_blocks, sample_intersections};

    #[test]
    fn test_no_correction_is_identity() {
        let correction = NoCorrection.correct("Tobin");
        assert_eq!(correction, Correction::unchanged("Tobin"));
        assert!(!correction.is_change());
    }

    #[test]
    fn test_known_name_is_unchanged() {
        let corrector = StreetNameCorrector::new(["MALVERN", "MAIN", "TOBIN"], 0.8);
        let correction = corrector.correct("tobin");
        assert_eq!(correction.corrected, "tobin");
        assert!(!correction.is_change());
    }

    #[test]
    fn test_misspelling_snaps_to_closest_name() {
        let corrector = StreetNameCorrector::new(["MALVERN", "MAIN", "TOBIN"], 0.8);
        let correction = corrector.correct("Malvren");
        assert_eq!(correction.original, "Malvren");
        assert_eq!(correction.corrected, "MALVERN");
        assert!(correction.is_change());
    }

    #[test]
    fn test_unrelated_token_is_unchanged() {
        let corrector = StreetNameCorrector::new(["MALVERN", "MAIN", "TOBIN"], 0.8);
        assert_eq!(corrector.correct("XYZZY"), Correction::unchanged("XYZZY"));
        assert_eq!(corrector.correct(""), Correction::unchanged(""));
    }

    #[test]
    fn test_from_dataset_collects_both_tables() {
        let dataset =
            DatasetHandle::from_frames(sample_blocks().unwrap(), sample_intersections().unwrap());
        let corrector = StreetNameCorrector::from_dataset(&dataset, 0.8).unwrap();

        // Block streets plus the intersection-only streets.
        for name in ["TOBIN", "MAIN", "VASSAR", "ELM", "OAK", "MALVERN", "PLEASANT", "COMMONWEALTH"] {
            assert!(corrector.known.contains(name), "missing {name}");
        }
        assert_eq!(corrector.len(), 8);
    }
}
