//! Seam for the external address parser.
//!
//! Turning free text into an [`AddressQuery`] or [`IntersectionQuery`] is the
//! job of a separate component. The resolver only calls it through
//! [`LocationParser`] and passes its [`ParsingError`]s through untouched.

use itertools::Itertools;
use thiserror::Error;

use crate::query::{AddressQuery, IntersectionQuery};

/// The parser could not turn the input into a structured query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Could not parse '{input}': {reason}")]
pub struct ParsingError {
    pub input: String,
    pub reason: String,
}

impl ParsingError {
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// What a parser made of its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLocation {
    Address(AddressQuery),
    Intersection(IntersectionQuery),
}

/// Normalizes and parses raw location text.
pub trait LocationParser: Send + Sync {
    /// Collapse whitespace and upper-case the input.
    fn normalize(&self, raw: &str) -> String {
        raw.split_whitespace().map(str::to_uppercase).join(" ")
    }

    fn parse(&self, normalized: &str) -> Result<ParsedLocation, ParsingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rejecting;

    impl LocationParser for Rejecting {
        fn parse(&self, normalized: &str) -> Result<ParsedLocation, ParsingError> {
            Err(ParsingError::new(normalized, "no grammar"))
        }
    }

    #[test]
    fn test_default_normalize() {
        assert_eq!(Rejecting.normalize("  32   vassar\tstreet "), "32 VASSAR STREET");
    }

    #[test]
    fn test_parsing_error_message() {
        let err = Rejecting.parse("???").unwrap_err();
        assert_eq!(err.to_string(), "Could not parse '???': no grammar");
    }
}
