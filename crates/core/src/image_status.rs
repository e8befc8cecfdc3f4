//! SDQA image status records (`sdqa_image_status` table).

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// A named status an image can be assigned after its ratings are evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStatus {
    id: DbId,
    name: String,
    definition: String,
}

impl ImageStatus {
    pub fn new(id: DbId, name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            definition: definition.into(),
        }
    }

    pub fn set(&mut self, id: DbId, name: impl Into<String>, definition: impl Into<String>) {
        *self = Self::new(id, name, definition);
    }

    pub fn id(&self) -> DbId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }
}
