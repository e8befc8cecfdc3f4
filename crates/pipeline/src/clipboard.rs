//! Keyed item store shared between the stages of one pipeline run.

use std::collections::HashMap;

use sdqa_core::rating::RatingSet;

use crate::error::PipelineError;
use crate::exposure::Exposure;
use crate::property_set::PropertySet;
use crate::source::ExtractedSource;

/// Anything a stage can read from or publish to the clipboard.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardItem {
    Exposure(Exposure),
    PropertySet(PropertySet),
    Sources(Vec<ExtractedSource>),
    Ratings(RatingSet),
}

impl ClipboardItem {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Exposure(_) => "an exposure",
            Self::PropertySet(_) => "a property set",
            Self::Sources(_) => "a source set",
            Self::Ratings(_) => "a rating set",
        }
    }
}

impl From<Exposure> for ClipboardItem {
    fn from(v: Exposure) -> Self {
        Self::Exposure(v)
    }
}

impl From<PropertySet> for ClipboardItem {
    fn from(v: PropertySet) -> Self {
        Self::PropertySet(v)
    }
}

impl From<Vec<ExtractedSource>> for ClipboardItem {
    fn from(v: Vec<ExtractedSource>) -> Self {
        Self::Sources(v)
    }
}

impl From<RatingSet> for ClipboardItem {
    fn from(v: RatingSet) -> Self {
        Self::Ratings(v)
    }
}

#[derive(Debug, Default)]
pub struct Clipboard {
    items: HashMap<String, ClipboardItem>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `item` under `key`, returning whatever was there before.
    pub fn put(
        &mut self,
        key: impl Into<String>,
        item: impl Into<ClipboardItem>,
    ) -> Option<ClipboardItem> {
        self.items.insert(key.into(), item.into())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&ClipboardItem> {
        self.items.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ClipboardItem> {
        self.items.remove(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn exposure(&self, key: &str) -> Result<&Exposure, PipelineError> {
        match self.require(key)? {
            ClipboardItem::Exposure(v) => Ok(v),
            other => Err(wrong_type(key, "an exposure", other)),
        }
    }

    pub fn property_set(&self, key: &str) -> Result<&PropertySet, PipelineError> {
        match self.require(key)? {
            ClipboardItem::PropertySet(v) => Ok(v),
            other => Err(wrong_type(key, "a property set", other)),
        }
    }

    pub fn sources(&self, key: &str) -> Result<&[ExtractedSource], PipelineError> {
        match self.require(key)? {
            ClipboardItem::Sources(v) => Ok(v),
            other => Err(wrong_type(key, "a source set", other)),
        }
    }

    pub fn ratings(&self, key: &str) -> Result<&RatingSet, PipelineError> {
        match self.require(key)? {
            ClipboardItem::Ratings(v) => Ok(v),
            other => Err(wrong_type(key, "a rating set", other)),
        }
    }

    /// Remove and return the rating set under `key`. A non-rating item is
    /// left in place.
    pub fn take_ratings(&mut self, key: &str) -> Result<RatingSet, PipelineError> {
        self.ratings(key)?;
        match self.items.remove(key) {
            Some(ClipboardItem::Ratings(v)) => Ok(v),
            _ => Err(PipelineError::MissingInput(format!("'{key}'"))),
        }
    }

    fn require(&self, key: &str) -> Result<&ClipboardItem, PipelineError> {
        self.items
            .get(key)
            .ok_or_else(|| PipelineError::MissingInput(format!("'{key}'")))
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &ClipboardItem) -> PipelineError {
    PipelineError::WrongItemType {
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use sdqa_core::rating::{Rating, RatingScope};

    use super::*;

    fn ratings() -> RatingSet {
        [Rating::new("overscanMean", 1021.5, 0.0, RatingScope::Amp).unwrap()]
            .into_iter()
            .collect()
    }

    #[test]
    fn put_and_read_typed_items() {
        let mut clipboard = Clipboard::new();
        clipboard.put("ccdMetadata", PropertySet::new().with("ccdExposureId", 5));
        clipboard.put("extractedSourceSet", vec![ExtractedSource::new(1, 0.0, 0.0)]);

        assert!(clipboard.contains("ccdMetadata"));
        assert_eq!(
            clipboard
                .property_set("ccdMetadata")
                .unwrap()
                .get_as_int64("ccdExposureId")
                .unwrap(),
            5
        );
        assert_eq!(clipboard.sources("extractedSourceSet").unwrap().len(), 1);
    }

    #[test]
    fn missing_key_is_missing_input() {
        let clipboard = Clipboard::new();
        assert_matches!(clipboard.exposure("exposure"), Err(PipelineError::MissingInput(_)));
    }

    #[test]
    fn wrong_item_type_names_both_kinds() {
        let mut clipboard = Clipboard::new();
        clipboard.put("exposure", PropertySet::new());
        assert_matches!(
            clipboard.exposure("exposure"),
            Err(PipelineError::WrongItemType { expected: "an exposure", found: "a property set", .. })
        );
    }

    #[test]
    fn put_replaces_and_returns_previous() {
        let mut clipboard = Clipboard::new();
        assert!(clipboard.put("r", ratings()).is_none());
        let previous = clipboard.put("r", RatingSet::new());
        assert_matches!(previous, Some(ClipboardItem::Ratings(set)) if set.len() == 1);
        assert_eq!(clipboard.len(), 1);
    }

    #[test]
    fn take_ratings_removes_only_rating_sets() {
        let mut clipboard = Clipboard::new();
        clipboard.put("r", ratings());
        clipboard.put("e", Exposure::default());

        assert_eq!(clipboard.take_ratings("r").unwrap(), ratings());
        assert!(!clipboard.contains("r"));

        assert_matches!(clipboard.take_ratings("e"), Err(PipelineError::WrongItemType { .. }));
        assert!(clipboard.contains("e"));
    }
}
