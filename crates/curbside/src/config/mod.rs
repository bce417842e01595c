use crate::error::GeocodingError;

/// Similarity a misspelled street name needs to be snapped onto a known one.
pub const DEFAULT_CORRECTION_THRESHOLD: f64 = 0.85;

/// Settings shared by the searchers of a [`crate::Geocoder`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocoderConfig {
    /// Upper bound on candidate rows read per search. `None` reads them all.
    pub max_candidates: Option<usize>,
    /// Minimum similarity in `(0, 1]` for street name correction.
    /// `None` leaves street names as given.
    pub street_correction_threshold: Option<f64>,
}

impl GeocoderConfig {
    pub fn builder() -> GeocoderConfigBuilder {
        GeocoderConfigBuilder::new()
    }
}

/// Builder for [`GeocoderConfig`].
#[derive(Debug, Clone, Default)]
pub struct GeocoderConfigBuilder {
    config: GeocoderConfig,
}

impl GeocoderConfigBuilder {
    /// Start from the defaults: no candidate cap, no correction.
    pub fn new() -> Self {
        Self {
            config: GeocoderConfig::default(),
        }
    }

    /// Exact street names only, at most 100 candidates per search.
    pub fn strict() -> Self {
        let mut builder = Self::new();
        builder.config.max_candidates = Some(100);
        builder.config.street_correction_threshold = None;
        builder
    }

    /// Correct misspelled street names against the dataset.
    pub fn forgiving() -> Self {
        let mut builder = Self::new();
        builder.config.street_correction_threshold = Some(DEFAULT_CORRECTION_THRESHOLD);
        builder
    }

    pub fn max_candidates(mut self, max: usize) -> Self {
        self.config.max_candidates = Some(max);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.config.max_candidates = None;
        self
    }

    pub fn no_correction(mut self) -> Self {
        self.config.street_correction_threshold = None;
        self
    }

    /// Enable street name correction with a threshold in `(0, 1]`.
    pub fn custom_correction_threshold(mut self, threshold: f64) -> Result<Self, GeocodingError> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(GeocodingError::ConfigError(format!(
                "Correction threshold must be within (0, 1], got {threshold}"
            )));
        }
        self.config.street_correction_threshold = Some(threshold);
        Ok(self)
    }

    pub fn build(self) -> GeocoderConfig {
        self.config
    }
}
