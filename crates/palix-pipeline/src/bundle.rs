use std::collections::BTreeMap;

use palix_codec::IndexedImage;
use serde::{Deserialize, Serialize};

/// Indexed images keyed by sanitized name.
///
/// Backed by a `BTreeMap`, so iteration and serialization are ordered by
/// name regardless of insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedBundle {
    images: BTreeMap<String, IndexedImage>,
}

impl NamedBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an image, returning the one it replaced.
    pub fn insert(&mut self, name: impl Into<String>, image: IndexedImage) -> Option<IndexedImage> {
        self.images.insert(name.into(), image)
    }

    pub fn get(&self, name: &str) -> Option<&IndexedImage> {
        self.images.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.images.keys().map(String::as_str)
    }

    /// `(name, image)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexedImage)> {
        self.images.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, IndexedImage)> for NamedBundle {
    fn from_iter<I: IntoIterator<Item = (String, IndexedImage)>>(iter: I) -> Self {
        Self {
            images: iter.into_iter().collect(),
        }
    }
}
