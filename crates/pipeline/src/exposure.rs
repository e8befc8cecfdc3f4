use serde::{Deserialize, Serialize};

use crate::property_set::PropertySet;

/// The part of an image the SDQA stages look at: its metadata.
///
/// Pixel data never reaches these stages; upstream processing records its
/// statistics as metadata cards instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exposure {
    #[serde(default)]
    metadata: PropertySet,
}

impl Exposure {
    pub fn new(metadata: PropertySet) -> Self {
        Self { metadata }
    }

    pub fn metadata(&self) -> &PropertySet {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut PropertySet {
        &mut self.metadata
    }
}
