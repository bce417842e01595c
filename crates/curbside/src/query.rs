//! Structured search criteria.
//!
//! Queries are produced by an address parser (see [`crate::LocationParser`]) or
//! built directly. Values keep the caller's casing; the searchers upper-case
//! them before matching against the dataset.

use std::fmt;

use itertools::Itertools;

use crate::{
    error::{GeocodingError, Result},
    parse::ParsingError,
};

fn clean(value: impl AsRef<str>) -> Option<String> {
    let value = value.as_ref().trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// A street address to resolve against the `blocks` table.
///
/// Immutable once built. A house number of `0` is treated as no number at all.
///
/// ```rust
/// use curbside::AddressQuery;
///
/// let query = AddressQuery::builder("Tobin").number(25).suffix("Ct").build()?;
/// assert_eq!(query.street(), "Tobin");
/// assert_eq!(query.number(), Some(25));
/// # Ok::<(), curbside::error::GeocodingError>(())
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressQuery {
    street: String,
    number: Option<i64>,
    pre_dir: Option<String>,
    suffix: Option<String>,
    post_dir: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
}

impl AddressQuery {
    pub fn builder(street: impl Into<String>) -> AddressQueryBuilder {
        AddressQueryBuilder::new(street)
    }

    #[must_use]
    pub fn street(&self) -> &str {
        &self.street
    }

    #[must_use]
    pub const fn number(&self) -> Option<i64> {
        self.number
    }

    #[must_use]
    pub fn pre_dir(&self) -> Option<&str> {
        self.pre_dir.as_deref()
    }

    #[must_use]
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    #[must_use]
    pub fn post_dir(&self) -> Option<&str> {
        self.post_dir.as_deref()
    }

    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    #[must_use]
    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }
}

impl fmt::Display for AddressQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let number = self.number.map(|n| n.to_string());
        let street = [
            number.as_deref(),
            self.pre_dir(),
            Some(self.street()),
            self.suffix(),
            self.post_dir(),
        ]
        .into_iter()
        .flatten()
        .join(" ");
        let locality = [self.city(), self.state(), self.postal_code()]
            .into_iter()
            .flatten()
            .join(" ");
        if locality.is_empty() {
            write!(f, "{street}")
        } else {
            write!(f, "{street}, {locality}")
        }
    }
}

/// Builder for [`AddressQuery`]. Blank values are treated as absent.
#[derive(Debug, Clone)]
pub struct AddressQueryBuilder {
    query: AddressQuery,
}

impl AddressQueryBuilder {
    pub fn new(street: impl Into<String>) -> Self {
        Self {
            query: AddressQuery {
                street: street.into().trim().to_string(),
                number: None,
                pre_dir: None,
                suffix: None,
                post_dir: None,
                city: None,
                state: None,
                postal_code: None,
            },
        }
    }

    pub fn number(mut self, number: i64) -> Self {
        self.query.number = (number != 0).then_some(number);
        self
    }

    /// Set the house number from text, which must be a non-negative integer.
    pub fn try_number(self, raw: &str) -> std::result::Result<Self, ParsingError> {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(number) if number >= 0 => Ok(self.number(number)),
            _ => Err(ParsingError::new(raw, "house number is not a non-negative integer")),
        }
    }

    pub fn pre_dir(mut self, pre_dir: impl AsRef<str>) -> Self {
        self.query.pre_dir = clean(pre_dir);
        self
    }

    pub fn suffix(mut self, suffix: impl AsRef<str>) -> Self {
        self.query.suffix = clean(suffix);
        self
    }

    pub fn post_dir(mut self, post_dir: impl AsRef<str>) -> Self {
        self.query.post_dir = clean(post_dir);
        self
    }

    pub fn city(mut self, city: impl AsRef<str>) -> Self {
        self.query.city = clean(city);
        self
    }

    pub fn state(mut self, state: impl AsRef<str>) -> Self {
        self.query.state = clean(state);
        self
    }

    pub fn postal_code(mut self, postal_code: impl AsRef<str>) -> Self {
        self.query.postal_code = clean(postal_code);
        self
    }

    pub fn build(self) -> Result<AddressQuery> {
        if self.query.street.is_empty() {
            return Err(GeocodingError::InvalidQuery(
                "street name is required".to_string(),
            ));
        }
        Ok(self.query)
    }
}

/// One street of an intersection: directions, name and suffix.
///
/// Every field is optional; absent fields match anything.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IntersectionDescriptor {
    pub pre_dir: Option<String>,
    pub street: Option<String>,
    pub suffix: Option<String>,
    pub post_dir: Option<String>,
}

impl IntersectionDescriptor {
    pub fn new(street: impl AsRef<str>) -> Self {
        Self {
            street: clean(street),
            ..Self::default()
        }
    }

    pub fn with_pre_dir(mut self, pre_dir: impl AsRef<str>) -> Self {
        self.pre_dir = clean(pre_dir);
        self
    }

    pub fn with_suffix(mut self, suffix: impl AsRef<str>) -> Self {
        self.suffix = clean(suffix);
        self
    }

    pub fn with_post_dir(mut self, post_dir: impl AsRef<str>) -> Self {
        self.post_dir = clean(post_dir);
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pre_dir.is_none()
            && self.street.is_none()
            && self.suffix.is_none()
            && self.post_dir.is_none()
    }
}

impl fmt::Display for IntersectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = [&self.pre_dir, &self.street, &self.suffix, &self.post_dir]
            .into_iter()
            .flatten()
            .join(" ");
        write!(f, "{text}")
    }
}

/// Two streets that cross. The order of the two sides carries no meaning.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntersectionQuery {
    a: IntersectionDescriptor,
    b: IntersectionDescriptor,
}

impl IntersectionQuery {
    #[must_use]
    pub const fn new(a: IntersectionDescriptor, b: IntersectionDescriptor) -> Self {
        Self { a, b }
    }

    /// Query by street names only.
    pub fn streets(a: impl AsRef<str>, b: impl AsRef<str>) -> Self {
        Self::new(IntersectionDescriptor::new(a), IntersectionDescriptor::new(b))
    }

    #[must_use]
    pub const fn a(&self) -> &IntersectionDescriptor {
        &self.a
    }

    #[must_use]
    pub const fn b(&self) -> &IntersectionDescriptor {
        &self.b
    }

    /// The same query with its sides exchanged.
    #[must_use]
    pub fn swapped(&self) -> Self {
        Self::new(self.b.clone(), self.a.clone())
    }
}

impl fmt::Display for IntersectionQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} & {}", self.a, self.b)
    }
}
