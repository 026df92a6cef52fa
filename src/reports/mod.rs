//! # Report Collections
//!
//! Report definitions are grouped into collections that nest arbitrarily.
//! The server hands the whole hierarchy over as one nested structure; the
//! editor turns it into tree nodes, lets the user rearrange them, and turns
//! the result back into the nested structure at save time.

pub mod drag_drop;
pub mod tree;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server identifier of a collection or document (`itemUID` on the wire).
pub type ItemUid = String;

/// Name of the collection whose label aggregates recursively.
pub const CUSTOM_COLLECTION_NAME: &str = "Custom";

/// A single report definition. Always a leaf of the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "itemUID")]
    pub item_uid: ItemUid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub order: i64,
    /// Server fields the editor does not interpret, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named, orderable container of documents and nested collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "itemUID")]
    pub item_uid: ItemUid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    pub fn new(item_uid: impl Into<ItemUid>, name: impl Into<String>, order: i64) -> Self {
        Self {
            item_uid: item_uid.into(),
            name: name.into(),
            order,
            extra: Map::new(),
        }
    }
}

impl Collection {
    pub fn new(item_uid: impl Into<ItemUid>, name: impl Into<String>, order: i64) -> Self {
        Self {
            item_uid: item_uid.into(),
            name: name.into(),
            order,
            collections: Vec::new(),
            documents: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_collections(mut self, collections: Vec<Collection>) -> Self {
        self.collections = collections;
        self
    }

    pub fn with_documents(mut self, documents: Vec<Document>) -> Self {
        self.documents = documents;
        self
    }

    /// Whether this is the distinguished collection whose label counts
    /// nested collections and documents recursively.
    pub fn is_custom(&self) -> bool {
        self.name.trim().eq_ignore_ascii_case(CUSTOM_COLLECTION_NAME)
    }

    /// Copy of this collection without nested collections or documents.
    pub fn shallow(&self) -> Self {
        Self {
            item_uid: self.item_uid.clone(),
            name: self.name.clone(),
            order: self.order,
            collections: Vec::new(),
            documents: Vec::new(),
            extra: self.extra.clone(),
        }
    }
}

/// Canonical collection and document records keyed by `itemUID`.
///
/// Tree nodes only carry identifiers; conversion back to the nested model
/// resolves them here, so the editable tree never aliases the persisted data.
#[derive(Debug, Clone, Default)]
pub struct ReportArena {
    collections: HashMap<ItemUid, Collection>,
    documents: HashMap<ItemUid, Document>,
}

impl ReportArena {
    pub fn from_collections(collections: &[Collection]) -> Self {
        let mut arena = Self::default();
        for collection in collections {
            arena.index(collection);
        }
        arena
    }

    fn index(&mut self, collection: &Collection) {
        self.collections
            .insert(collection.item_uid.clone(), collection.shallow());
        for document in &collection.documents {
            self.documents
                .insert(document.item_uid.clone(), document.clone());
        }
        for nested in &collection.collections {
            self.index(nested);
        }
    }

    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.get(id)
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }
}
