//! Typed key/value metadata attached to exposures and pipeline inputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sdqa_core::persistence::{ExposureIds, ExposureLevel};

use crate::error::PipelineError;

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Double(_) => "double",
            Self::String(_) => "string",
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

/// Named metadata values, e.g. FITS header cards of an exposure.
///
/// Names are case sensitive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySet {
    properties: BTreeMap<String, PropertyValue>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Builder form of [`PropertySet::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Read `name` as a double. Integer values are widened.
    pub fn get_as_double(&self, name: &str) -> Result<f64, PipelineError> {
        match self.require(name)? {
            PropertyValue::Double(v) => Ok(*v),
            PropertyValue::Int(v) => Ok(*v as f64),
            _ => Err(type_error(name, "a number")),
        }
    }

    pub fn get_as_int64(&self, name: &str) -> Result<i64, PipelineError> {
        match self.require(name)? {
            PropertyValue::Int(v) => Ok(*v),
            _ => Err(type_error(name, "an integer")),
        }
    }

    pub fn get_as_string(&self, name: &str) -> Result<&str, PipelineError> {
        match self.require(name)? {
            PropertyValue::String(v) => Ok(v),
            _ => Err(type_error(name, "a string")),
        }
    }

    /// Collect whichever of `exposureId`, `ccdExposureId` and
    /// `ampExposureId` are present. A present id of the wrong type is an
    /// error; absent ids stay `None`.
    pub fn exposure_ids(&self) -> Result<ExposureIds, PipelineError> {
        Ok(ExposureIds {
            exposure_id: self.optional_id(ExposureLevel::Fpa)?,
            ccd_exposure_id: self.optional_id(ExposureLevel::Ccd)?,
            amp_exposure_id: self.optional_id(ExposureLevel::Amp)?,
        })
    }

    fn optional_id(&self, level: ExposureLevel) -> Result<Option<i64>, PipelineError> {
        let name = level.id_property();
        if self.contains(name) {
            self.get_as_int64(name).map(Some)
        } else {
            Ok(None)
        }
    }

    fn require(&self, name: &str) -> Result<&PropertyValue, PipelineError> {
        self.properties
            .get(name)
            .ok_or_else(|| PipelineError::MissingProperty(name.to_string()))
    }
}

fn type_error(name: &str, expected: &'static str) -> PipelineError {
    PipelineError::PropertyType {
        name: name.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn double_reads_widen_integers() {
        let props = PropertySet::new()
            .with("OVERSCAN_MEAN", 1021.5)
            .with("nSaturatePix", 12);
        assert_eq!(props.get_as_double("OVERSCAN_MEAN").unwrap(), 1021.5);
        assert_eq!(props.get_as_double("nSaturatePix").unwrap(), 12.0);
    }

    #[test]
    fn int64_read_rejects_doubles() {
        let props = PropertySet::new()
            .with("ccdExposureId", 88_000_001_i64)
            .with("gain", 2.5);
        assert_eq!(props.get_as_int64("ccdExposureId").unwrap(), 88_000_001);
        assert_matches!(
            props.get_as_int64("gain"),
            Err(PipelineError::PropertyType { name, .. }) if name == "gain"
        );
    }

    #[test]
    fn missing_property_is_reported_by_name() {
        let props = PropertySet::new();
        assert_matches!(
            props.get_as_double("overscanMean"),
            Err(PipelineError::MissingProperty(name)) if name == "overscanMean"
        );
    }

    #[test]
    fn string_and_bool_values() {
        let mut props = PropertySet::new();
        props.set("FILTER", "r");
        props.set("SATURATED", true);
        assert_eq!(props.get_as_string("FILTER").unwrap(), "r");
        assert!(props.get_as_double("FILTER").is_err());
        assert_eq!(props.get("SATURATED").unwrap().type_name(), "bool");
        assert_eq!(props.names().collect::<Vec<_>>(), ["FILTER", "SATURATED"]);
    }

    #[test]
    fn set_replaces_previous_value() {
        let mut props = PropertySet::new().with("x", 1);
        props.set("x", "one");
        assert_eq!(props.len(), 1);
        assert_eq!(props.get_as_string("x").unwrap(), "one");
    }

    #[test]
    fn deserializes_from_plain_json_object() {
        let props: PropertySet = serde_json::from_str(
            r#"{"ccdExposureId": 42, "overscanMean": 3.25, "FILTER": "g", "ok": false}"#,
        )
        .unwrap();
        assert_eq!(props.get("ccdExposureId"), Some(&PropertyValue::Int(42)));
        assert_eq!(props.get("overscanMean"), Some(&PropertyValue::Double(3.25)));
        assert_eq!(props.get("ok"), Some(&PropertyValue::Bool(false)));
    }

    #[test]
    fn exposure_ids_from_metadata() {
        let props = PropertySet::new()
            .with("ccdExposureId", 42)
            .with("exposureId", 7);
        let ids = props.exposure_ids().unwrap();
        assert_eq!(ids.exposure_id, Some(7));
        assert_eq!(ids.ccd_exposure_id, Some(42));
        assert_eq!(ids.amp_exposure_id, None);

        let bad = PropertySet::new().with("ampExposureId", "nope");
        assert_matches!(bad.exposure_ids(), Err(PipelineError::PropertyType { .. }));
    }
}
