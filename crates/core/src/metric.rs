//! SDQA metric definitions.
//!
//! A [`Metric`] is one record of the `sdqa_metric` table: the name a rating
//! is filed under, its physical units, the data type of its values and a
//! free-text definition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Data type of a metric's values.
///
/// Numeric codes: `INVALID = -1`, `FLOAT = 0`, `INT = 1`. Names
/// deserialize in any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum DataType {
    #[default]
    Invalid,
    Float,
    Int,
}

impl DataType {
    pub fn code(self) -> i16 {
        match self {
            Self::Invalid => -1,
            Self::Float => 0,
            Self::Int => 1,
        }
    }

    pub fn from_code(code: i16) -> Result<Self, CoreError> {
        match code {
            -1 => Ok(Self::Invalid),
            0 => Ok(Self::Float),
            1 => Ok(Self::Int),
            other => Err(CoreError::InvalidArgument(format!(
                "Unknown metric data type code: {other}"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "INVALID",
            Self::Float => "FLOAT",
            Self::Int => "INT",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Invalid, Self::Float, Self::Int]
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::InvalidArgument(format!("Unknown metric data type: '{s}'")))
    }
}

impl TryFrom<String> for DataType {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A metric definition.
///
/// `Metric::default()` carries `DataType::Invalid` until [`Metric::set`]
/// succeeds. Deserialization goes through [`Metric::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MetricFields")]
pub struct Metric {
    id: DbId,
    name: String,
    physical_units: String,
    data_type: DataType,
    definition: String,
}

#[derive(Deserialize)]
struct MetricFields {
    id: DbId,
    name: String,
    physical_units: String,
    data_type: DataType,
    definition: String,
}

impl TryFrom<MetricFields> for Metric {
    type Error = CoreError;

    fn try_from(f: MetricFields) -> Result<Self, Self::Error> {
        Metric::new(f.id, f.name, f.physical_units, f.data_type, f.definition)
    }
}

impl Metric {
    /// Fails with `InvalidArgument` if `data_type` is `INVALID`.
    pub fn new(
        id: DbId,
        name: impl Into<String>,
        physical_units: impl Into<String>,
        data_type: DataType,
        definition: impl Into<String>,
    ) -> Result<Self, CoreError> {
        if data_type == DataType::Invalid {
            return Err(CoreError::InvalidArgument(
                "metric data type must be FLOAT or INT".to_string(),
            ));
        }
        Ok(Self {
            id,
            name: name.into(),
            physical_units: physical_units.into(),
            data_type,
            definition: definition.into(),
        })
    }

    /// Overwrite every field. On error the metric is left untouched.
    pub fn set(
        &mut self,
        id: DbId,
        name: impl Into<String>,
        physical_units: impl Into<String>,
        data_type: DataType,
        definition: impl Into<String>,
    ) -> Result<(), CoreError> {
        *self = Self::new(id, name, physical_units, data_type, definition)?;
        Ok(())
    }

    pub fn id(&self) -> DbId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn physical_units(&self) -> &str {
        &self.physical_units
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }
}
