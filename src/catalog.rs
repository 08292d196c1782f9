//! The fixed set of collections this adapter exposes.
//!
//! Each collection is a [`CollectionStrategy`] that knows its own name, its
//! searchable fields and how to resolve rows. The catalog is built once at
//! startup and never mutated, so it is shared freely between calls.

use crate::error::{GripperError, Result};
use crate::resolver::{CollectionStrategy, Datasets, Hda, Histories};

/// Primary-key search field.
pub const ID_FIELD: &str = "$.id";
/// `hda` rows searchable by their history.
pub const HISTORY_ID_FIELD: &str = "$.history_id";
/// `hda` rows searchable by their dataset.
pub const DATASET_ID_FIELD: &str = "$.dataset_id";

pub struct Catalog {
    collections: Vec<Box<dyn CollectionStrategy>>,
}

impl Catalog {
    pub fn new(collections: Vec<Box<dyn CollectionStrategy>>) -> Self {
        Self { collections }
    }

    /// The Galaxy collections: `histories`, `datasets` and the joined `hda`.
    pub fn galaxy() -> Self {
        Self::new(vec![
            Box::new(Histories),
            Box::new(Datasets),
            Box::new(Hda),
        ])
    }

    /// Collection names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.collections.iter().map(|c| c.name())
    }

    /// Search fields declared for a collection.
    pub fn describe(&self, name: &str) -> Result<&'static [&'static str]> {
        self.get(name).map(|c| c.search_fields())
    }

    pub fn get(&self, name: &str) -> Result<&dyn CollectionStrategy> {
        self.collections
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
            .ok_or_else(|| GripperError::CollectionNotFound(name.to_string()))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::galaxy()
    }
}
