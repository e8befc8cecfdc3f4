//! SDQA ratings and rating sets.
//!
//! A [`Rating`] is one named scalar quality measurement with an uncertainty
//! and a [`RatingScope`] telling persistence which exposure level (and so
//! which rating table) it belongs to. A [`RatingSet`] is the ordered
//! collection a stage assembles and hands off whole.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// RatingScope
// ---------------------------------------------------------------------------

/// Image level a rating applies to.
///
/// Numeric codes match the values stored by earlier SDQA tooling:
/// `INVALID = -1`, `AMP = 0`, `CCD = 1`, `FPA = 2`, `FOOTPRINT = 3`.
///
/// Serialized as the upper-case name; deserialized through [`FromStr`], so
/// any case is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum RatingScope {
    #[default]
    Invalid,
    Amp,
    Ccd,
    Fpa,
    Footprint,
}

impl RatingScope {
    /// Every scope a rating may carry.
    pub const VALID: [RatingScope; 4] = [Self::Amp, Self::Ccd, Self::Fpa, Self::Footprint];

    /// Return the numeric code for this scope.
    pub fn code(self) -> i32 {
        match self {
            Self::Invalid => -1,
            Self::Amp => 0,
            Self::Ccd => 1,
            Self::Fpa => 2,
            Self::Footprint => 3,
        }
    }

    /// Parse a numeric scope code.
    pub fn from_code(code: i32) -> Result<Self, CoreError> {
        match code {
            -1 => Ok(Self::Invalid),
            0 => Ok(Self::Amp),
            1 => Ok(Self::Ccd),
            2 => Ok(Self::Fpa),
            3 => Ok(Self::Footprint),
            other => Err(CoreError::InvalidArgument(format!(
                "Unknown rating scope code: {other}"
            ))),
        }
    }

    /// Return the upper-case name of this scope.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "INVALID",
            Self::Amp => "AMP",
            Self::Ccd => "CCD",
            Self::Fpa => "FPA",
            Self::Footprint => "FOOTPRINT",
        }
    }

    pub fn is_valid(self) -> bool {
        self != Self::Invalid
    }
}

impl fmt::Display for RatingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RatingScope {
    type Err = CoreError;

    /// Parse a scope name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Invalid, Self::Amp, Self::Ccd, Self::Fpa, Self::Footprint]
            .into_iter()
            .find(|scope| scope.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::InvalidArgument(format!("Unknown rating scope: '{s}'")))
    }
}

impl TryFrom<String> for RatingScope {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ---------------------------------------------------------------------------
// MetricValue
// ---------------------------------------------------------------------------

/// A metric value or uncertainty, kept in the form it was produced in.
///
/// Integer counts (e.g. number of astrometric matches) stay `Int` so that
/// 64-bit values are never squeezed through a double.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
}

impl MetricValue {
    /// Widen to `f64` (lossy for integers beyond 2^53).
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// The integer value, if this is an `Int`.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(v),
            Self::Float(_) => None,
        }
    }

    pub fn is_int(self) -> bool {
        matches!(self, Self::Int(_))
    }
}

impl Default for MetricValue {
    fn default() -> Self {
        Self::Float(0.0)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for MetricValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for MetricValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

/// A single named SDQA measurement.
///
/// `Rating::default()` is the empty rating: its scope is `INVALID` until
/// [`Rating::set`] succeeds. Names, values and errors are not validated;
/// only the scope is.
///
/// Deserialization goes through [`Rating::new`], so an `INVALID` scope is
/// rejected there too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RatingFields")]
pub struct Rating {
    name: String,
    value: MetricValue,
    error: MetricValue,
    scope: RatingScope,
}

#[derive(Deserialize)]
struct RatingFields {
    name: String,
    value: MetricValue,
    error: MetricValue,
    scope: RatingScope,
}

impl TryFrom<RatingFields> for Rating {
    type Error = CoreError;

    fn try_from(f: RatingFields) -> Result<Self, Self::Error> {
        Rating::new(f.name, f.value, f.error, f.scope)
    }
}

impl Rating {
    /// Build a fully populated rating. Fails if `scope` is `INVALID`.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<MetricValue>,
        error: impl Into<MetricValue>,
        scope: RatingScope,
    ) -> Result<Self, CoreError> {
        check_scope(scope)?;
        Ok(Self {
            name: name.into(),
            value: value.into(),
            error: error.into(),
            scope,
        })
    }

    /// Reassign every field. On error the rating is left untouched.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<MetricValue>,
        error: impl Into<MetricValue>,
        scope: RatingScope,
    ) -> Result<(), CoreError> {
        *self = Self::new(name, value, error, scope)?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> MetricValue {
        self.value
    }

    pub fn error(&self) -> MetricValue {
        self.error
    }

    pub fn scope(&self) -> RatingScope {
        self.scope
    }
}

fn check_scope(scope: RatingScope) -> Result<(), CoreError> {
    if scope.is_valid() {
        Ok(())
    } else {
        Err(CoreError::InvalidArgument(
            "rating scope must be one of AMP, CCD, FPA, FOOTPRINT".to_string(),
        ))
    }
}

// ---------------------------------------------------------------------------
// RatingSet
// ---------------------------------------------------------------------------

/// Ordered, append-only collection of ratings.
///
/// Iteration follows insertion order; `iter().rev()` walks it backwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingSet {
    ratings: Vec<Rating>,
}

impl RatingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ratings: Vec::with_capacity(capacity),
        }
    }

    /// Add a rating at the end of the set.
    pub fn append(&mut self, rating: Rating) {
        self.ratings.push(rating);
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Rating> {
        self.ratings.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rating> {
        self.ratings.iter()
    }

    pub fn as_slice(&self) -> &[Rating] {
        &self.ratings
    }

    /// The scope shared by every rating in the set.
    ///
    /// Persistence writes a set into a single scope table, so an empty set
    /// or one mixing scopes is rejected.
    pub fn scope(&self) -> Result<RatingScope, CoreError> {
        let first = self
            .ratings
            .first()
            .ok_or_else(|| CoreError::Validation("rating set is empty".to_string()))?
            .scope();
        if let Some(other) = self.ratings.iter().find(|r| r.scope() != first) {
            return Err(CoreError::Validation(format!(
                "rating set mixes scopes {first} and {} (rating '{}')",
                other.scope(),
                other.name()
            )));
        }
        Ok(first)
    }
}

impl IntoIterator for RatingSet {
    type Item = Rating;
    type IntoIter = std::vec::IntoIter<Rating>;

    fn into_iter(self) -> Self::IntoIter {
        self.ratings.into_iter()
    }
}

impl<'a> IntoIterator for &'a RatingSet {
    type Item = &'a Rating;
    type IntoIter = std::slice::Iter<'a, Rating>;

    fn into_iter(self) -> Self::IntoIter {
        self.ratings.iter()
    }
}

impl FromIterator<Rating> for RatingSet {
    fn from_iter<I: IntoIterator<Item = Rating>>(iter: I) -> Self {
        Self {
            ratings: iter.into_iter().collect(),
        }
    }
}

impl Extend<Rating> for RatingSet {
    fn extend<I: IntoIterator<Item = Rating>>(&mut self, iter: I) {
        self.ratings.extend(iter);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
