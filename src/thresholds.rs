//! Risk thresholds and temperature categorization.
//!
//! A threshold set is an ordered chain of half-open ranges `[from, to)`,
//! each mapped to a risk label. The chain must be contiguous: every range
//! starts where the previous one ends.
//!
//! # Example
//!
//! ```
//! use heatwatch::thresholds::{self, ThresholdSet};
//!
//! let set = ThresholdSet::default();
//! assert_eq!(set.label_for(27.5), "Moderate Risk");
//! assert_eq!(set.safe_upper_bound(), 26.0);
//! assert_eq!(thresholds::label_for(set.ranges(), -5.0), thresholds::UNKNOWN_LABEL);
//! ```

use serde::Serialize;

use crate::error::{Error, Result};

/// Label returned for temperatures outside every range.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Label identifying the range whose upper edge triggers alerts.
pub const SAFE_LABEL: &str = "Safe";

/// Safe bound used when no range is labelled "Safe".
pub const DEFAULT_SAFE_BOUND: f64 = 26.0;

/// Number of ranges the threshold editor submits.
pub const DEFAULT_RANGE_COUNT: u32 = 4;

pub const MSG_FROM_NOT_BELOW_TO: &str = "'From' temperature must be less than 'To' temperature";
pub const MSG_NOT_CONTINUOUS: &str =
    "Temperature ranges must be continuous (end of one range equals start of next)";
pub const MSG_INVALID_VALUES: &str = "Please enter valid temperature values";
pub const MSG_EMPTY_LABEL: &str = "Threshold labels must not be empty";

/// A single risk band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdRange {
    pub from: f64,
    pub to: f64,
    pub label: String,
}

impl ThresholdRange {
    pub fn new(from: f64, to: f64, label: impl Into<String>) -> Self {
        Self {
            from,
            to,
            label: label.into(),
        }
    }

    /// Whether `temperature` falls in `[from, to)`.
    pub fn contains(&self, temperature: f64) -> bool {
        self.from <= temperature && temperature < self.to
    }

    fn is_safe(&self) -> bool {
        self.label.eq_ignore_ascii_case(SAFE_LABEL)
    }
}

/// The ranges installed on first start.
pub fn default_ranges() -> Vec<ThresholdRange> {
    vec![
        ThresholdRange::new(18.0, 26.0, "Safe"),
        ThresholdRange::new(26.0, 30.0, "Moderate Risk"),
        ThresholdRange::new(30.0, 35.0, "High Risk"),
        ThresholdRange::new(35.0, 100.0, "Very High Risk"),
    ]
}

/// Label of the range containing `temperature`, or [`UNKNOWN_LABEL`].
pub fn label_for(ranges: &[ThresholdRange], temperature: f64) -> &str {
    ranges
        .iter()
        .find(|r| r.contains(temperature))
        .map_or(UNKNOWN_LABEL, |r| r.label.as_str())
}

/// Upper edge of the lowest "Safe" range (case-insensitive), or
/// [`DEFAULT_SAFE_BOUND`] when there is none.
pub fn safe_upper_bound(ranges: &[ThresholdRange]) -> f64 {
    ranges
        .iter()
        .filter(|r| r.is_safe())
        .min_by(|a, b| a.from.total_cmp(&b.from))
        .map_or(DEFAULT_SAFE_BOUND, |r| r.to)
}

/// A threshold set that passed validation.
///
/// Only [`ThresholdSet::validate`] and [`Default`] construct one, so a
/// `ThresholdSet` is always sorted, contiguous and of positive width.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThresholdSet(Vec<ThresholdRange>);

impl Default for ThresholdSet {
    fn default() -> Self {
        Self(default_ranges())
    }
}

impl ThresholdSet {
    /// Validate a candidate replacement set.
    ///
    /// Checks run in order and the first failure rejects the whole batch:
    /// 1. exactly `expected_len` ranges
    /// 2. finite bounds with `from < to`
    /// 3. non-empty labels
    /// 4. sorted by `from`, each range starts at the previous `to`
    pub fn validate(mut ranges: Vec<ThresholdRange>, expected_len: usize) -> Result<Self> {
        // ---
        if ranges.len() != expected_len {
            return Err(Error::Validation(format!(
                "Expected {expected_len} threshold ranges, got {}",
                ranges.len()
            )));
        }

        for r in &ranges {
            if !r.from.is_finite() || !r.to.is_finite() {
                return Err(Error::Validation(MSG_INVALID_VALUES.into()));
            }
            if r.from >= r.to {
                return Err(Error::Validation(MSG_FROM_NOT_BELOW_TO.into()));
            }
        }

        for r in ranges.iter_mut() {
            r.label = r.label.trim().to_string();
            if r.label.is_empty() {
                return Err(Error::Validation(MSG_EMPTY_LABEL.into()));
            }
        }

        ranges.sort_by(|a, b| a.from.total_cmp(&b.from));
        if ranges.windows(2).any(|pair| pair[0].to != pair[1].from) {
            return Err(Error::Validation(MSG_NOT_CONTINUOUS.into()));
        }

        Ok(Self(ranges))
    }

    pub fn ranges(&self) -> &[ThresholdRange] {
        &self.0
    }

    pub fn into_ranges(self) -> Vec<ThresholdRange> {
        self.0
    }

    pub fn label_for(&self, temperature: f64) -> &str {
        label_for(&self.0, temperature)
    }

    pub fn safe_upper_bound(&self) -> f64 {
        safe_upper_bound(&self.0)
    }
}
