//! In-memory document storage.

use std::collections::HashMap;
use std::sync::RwLock;

use wareflow_core::{DocumentId, InventoryError, InventoryResult};
use wareflow_documents::Document;

/// In-memory document store. Intended for tests/dev.
///
/// `modify` holds the store's write lock for the whole closure, which is what
/// serializes competing transitions on one document: two concurrent finalize
/// calls cannot both observe `waiting`.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<DocumentId, Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, document: Document) -> InventoryResult<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| InventoryError::storage("document store lock poisoned"))?;
        documents.insert(document.id, document);
        Ok(())
    }

    pub fn get(&self, id: DocumentId) -> InventoryResult<Document> {
        let documents = self
            .documents
            .read()
            .map_err(|_| InventoryError::storage("document store lock poisoned"))?;
        documents
            .get(&id)
            .cloned()
            .ok_or(InventoryError::UnknownDocument(id))
    }

    /// Run `f` against the stored document under the write lock. The
    /// document is only updated when `f` succeeds.
    pub fn modify<T, F>(&self, id: DocumentId, f: F) -> InventoryResult<T>
    where
        F: FnOnce(&mut Document) -> InventoryResult<T>,
    {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| InventoryError::storage("document store lock poisoned"))?;
        let document = documents
            .get_mut(&id)
            .ok_or(InventoryError::UnknownDocument(id))?;

        let mut scratch = document.clone();
        let value = f(&mut scratch)?;
        *document = scratch;
        Ok(value)
    }
}
