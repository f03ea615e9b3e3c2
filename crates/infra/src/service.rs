//! The boundary facade.
//!
//! `InventoryService` is what the (out-of-scope) request/response layer
//! calls: it wires the catalog, the location directory, the ledger, and the
//! document store together and exposes the core operations with their
//! domain error kinds. It adds no business validation of its own — that all
//! lives in the domain crates.

use std::sync::Arc;

use wareflow_catalog::{Catalog, Category, InMemoryCatalog, NewProduct, Product};
use wareflow_core::{
    CategoryId, DocumentId, InventoryResult, LocationId, Sku, UserId, WarehouseId,
};
use wareflow_documents::{Document, DocumentKind, DocumentLine};
use wareflow_ledger::{
    InMemoryMovementStore, Ledger, Movement, MovementRequest, MovementStore, StockKey,
};
use wareflow_locations::{
    InMemoryLocationDirectory, Location, LocationDirectory, LocationType, Warehouse,
};

use crate::document_store::InMemoryDocumentStore;

/// One wired inventory backend.
pub struct InventoryService<S> {
    catalog: Arc<InMemoryCatalog>,
    locations: Arc<InMemoryLocationDirectory>,
    ledger: Ledger<S>,
    documents: InMemoryDocumentStore,
}

impl InventoryService<InMemoryMovementStore> {
    /// Fully in-memory wiring, the only storage backend this workspace
    /// ships.
    pub fn in_memory() -> Self {
        let catalog = Arc::new(InMemoryCatalog::new());
        let locations = Arc::new(InMemoryLocationDirectory::new());
        let ledger = Ledger::new(
            InMemoryMovementStore::new(),
            catalog.clone() as Arc<dyn Catalog>,
            locations.clone() as Arc<dyn LocationDirectory>,
        );
        Self {
            catalog,
            locations,
            ledger,
            documents: InMemoryDocumentStore::new(),
        }
    }
}

impl<S> InventoryService<S>
where
    S: MovementStore,
{
    // --- catalog ---

    pub fn create_product(&self, new: NewProduct) -> InventoryResult<Product> {
        self.catalog.create_product(new)
    }

    pub fn product(&self, sku: &Sku) -> InventoryResult<Product> {
        self.catalog.product(sku)
    }

    pub fn update_product_details(
        &self,
        sku: &Sku,
        name: Option<String>,
        description: Option<String>,
    ) -> InventoryResult<Product> {
        self.catalog.update_details(sku, name, description)
    }

    pub fn create_category(
        &self,
        name: &str,
        description: Option<String>,
    ) -> InventoryResult<Category> {
        self.catalog.create_category(name, description)
    }

    pub fn category(&self, id: CategoryId) -> InventoryResult<Category> {
        self.catalog.category(id)
    }

    // --- location graph ---

    pub fn create_warehouse(&self, code: &str, address: &str) -> InventoryResult<Warehouse> {
        self.locations.create_warehouse(code, address)
    }

    pub fn warehouse(&self, id: WarehouseId) -> InventoryResult<Warehouse> {
        self.locations.warehouse(id)
    }

    pub fn create_location(
        &self,
        warehouse_id: WarehouseId,
        name: &str,
        location_type: LocationType,
    ) -> InventoryResult<Location> {
        self.locations.create_location(warehouse_id, name, location_type)
    }

    pub fn location(&self, id: LocationId) -> InventoryResult<Location> {
        self.locations.location(id)
    }

    // --- ledger & projection ---

    /// Append a movement outside any document (e.g. an operational
    /// correction). Document finalization goes through
    /// [`InventoryService::finalize_document`] instead.
    pub fn append_movement(&self, request: MovementRequest) -> InventoryResult<Movement> {
        self.ledger.append(request)
    }

    pub fn quantity(&self, sku: &Sku, location: LocationId) -> i64 {
        self.ledger.quantity(sku, location)
    }

    pub fn stock_by_sku(&self, sku: &Sku) -> Vec<(LocationId, i64)> {
        self.ledger.levels().by_sku(sku)
    }

    pub fn stock_snapshot(&self) -> Vec<(StockKey, i64)> {
        self.ledger.levels().snapshot()
    }

    pub fn movements(&self) -> InventoryResult<Vec<Movement>> {
        self.ledger.movements()
    }

    /// Replay the whole movement log into a fresh projection. Integrity
    /// repair; safe to run at any time.
    pub fn rebuild_projection(&self) -> InventoryResult<usize> {
        self.ledger.rebuild()
    }

    // --- documents ---

    pub fn create_document(
        &self,
        kind: DocumentKind,
        counterparty: Option<String>,
        reason: Option<String>,
        created_by: UserId,
    ) -> InventoryResult<Document> {
        let document = Document::new(kind, counterparty, reason, created_by);
        self.documents.insert(document.clone())?;
        Ok(document)
    }

    pub fn document(&self, id: DocumentId) -> InventoryResult<Document> {
        self.documents.get(id)
    }

    pub fn add_line(&self, id: DocumentId, line: DocumentLine) -> InventoryResult<Document> {
        self.documents.modify(id, |document| {
            document.add_line(line)?;
            Ok(document.clone())
        })
    }

    pub fn submit_document(&self, id: DocumentId) -> InventoryResult<Document> {
        self.documents.modify(id, |document| {
            document.submit()?;
            Ok(document.clone())
        })
    }

    pub fn cancel_document(&self, id: DocumentId) -> InventoryResult<Document> {
        self.documents.modify(id, |document| {
            document.cancel()?;
            Ok(document.clone())
        })
    }

    /// waiting → done: commit one movement per line, all-or-nothing.
    ///
    /// The ledger call happens inside the document store's write section, so
    /// a competing finalize or cancel of the same document waits and then
    /// fails its own status check. Any line failing validation or
    /// sufficiency aborts the whole batch before the status flips.
    pub fn finalize_document(&self, id: DocumentId, actor: UserId) -> InventoryResult<Document> {
        self.documents.modify(id, |document| {
            let requests = document.movement_requests(actor)?;
            let committed = self.ledger.append_all(requests)?;
            document.mark_done()?;
            tracing::info!(
                document = %document.id,
                movements = committed.len(),
                "document finalized"
            );
            Ok(document.clone())
        })
    }
}
