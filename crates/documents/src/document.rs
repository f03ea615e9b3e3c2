use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wareflow_core::{
    DocumentId, InventoryError, InventoryResult, LocationId, MovementKind, Sku, UserId,
};
use wareflow_ledger::MovementRequest;

/// Document kinds, one per movement kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Receipt,
    Delivery,
    Transfer,
    Adjustment,
}

impl DocumentKind {
    pub fn movement_kind(&self) -> MovementKind {
        match self {
            DocumentKind::Receipt => MovementKind::Receipt,
            DocumentKind::Delivery => MovementKind::Delivery,
            DocumentKind::Transfer => MovementKind::Transfer,
            DocumentKind::Adjustment => MovementKind::Adjustment,
        }
    }
}

/// Document status lifecycle. Forward-only; done and canceled are terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Draft,
    Waiting,
    Done,
    Canceled,
}

impl DocumentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Done | DocumentStatus::Canceled)
    }

    fn can_advance_to(self, to: DocumentStatus) -> bool {
        use DocumentStatus::{Canceled, Done, Draft, Waiting};
        matches!(
            (self, to),
            (Draft, Waiting) | (Waiting, Done) | (Draft, Canceled) | (Waiting, Canceled),
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Waiting => "waiting",
            DocumentStatus::Done => "done",
            DocumentStatus::Canceled => "canceled",
        }
    }
}

impl core::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line item.
///
/// Quantity is strictly positive except on adjustment lines, where it is a
/// signed nonzero delta at the line's single location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLine {
    pub sku: Sku,
    pub quantity: i64,
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
}

impl DocumentLine {
    pub fn receipt(sku: Sku, quantity: i64, to: LocationId) -> Self {
        Self {
            sku,
            quantity,
            from_location: None,
            to_location: Some(to),
        }
    }

    pub fn delivery(sku: Sku, quantity: i64, from: LocationId) -> Self {
        Self {
            sku,
            quantity,
            from_location: Some(from),
            to_location: None,
        }
    }

    pub fn transfer(sku: Sku, quantity: i64, from: LocationId, to: LocationId) -> Self {
        Self {
            sku,
            quantity,
            from_location: Some(from),
            to_location: Some(to),
        }
    }

    /// An adjustment line: signed `delta` at `location`.
    pub fn adjustment(sku: Sku, delta: i64, location: LocationId) -> Self {
        Self {
            sku,
            quantity: delta,
            from_location: None,
            to_location: Some(location),
        }
    }

    fn validate_for(&self, kind: DocumentKind) -> InventoryResult<()> {
        match kind {
            DocumentKind::Adjustment => {
                if self.quantity == 0 {
                    return Err(InventoryError::InvalidQuantity(0));
                }
                if self.from_location.is_some() || self.to_location.is_none() {
                    return Err(InventoryError::validation(
                        "adjustment line names exactly one location (as destination)",
                    ));
                }
            }
            DocumentKind::Receipt => {
                if self.quantity <= 0 {
                    return Err(InventoryError::InvalidQuantity(self.quantity));
                }
                if self.from_location.is_some() || self.to_location.is_none() {
                    return Err(InventoryError::validation(
                        "receipt line needs a destination and no source",
                    ));
                }
            }
            DocumentKind::Delivery => {
                if self.quantity <= 0 {
                    return Err(InventoryError::InvalidQuantity(self.quantity));
                }
                if self.from_location.is_none() || self.to_location.is_some() {
                    return Err(InventoryError::validation(
                        "delivery line needs a source and no destination",
                    ));
                }
            }
            DocumentKind::Transfer => {
                if self.quantity <= 0 {
                    return Err(InventoryError::InvalidQuantity(self.quantity));
                }
                match (self.from_location, self.to_location) {
                    (Some(from), Some(to)) if from != to => {}
                    (Some(_), Some(_)) => {
                        return Err(InventoryError::validation(
                            "transfer line endpoints must differ",
                        ));
                    }
                    _ => {
                        return Err(InventoryError::validation(
                            "transfer line needs both a source and a destination",
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// A document: header plus line items.
///
/// Inert data until finalization; the `waiting → done` transition is the
/// only one that produces movements, and cancellation never touches the
/// ledger. Lines are editable in draft only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub kind: DocumentKind,
    status: DocumentStatus,
    /// Supplier (receipts) or customer (deliveries); free text.
    pub counterparty: Option<String>,
    /// Why an adjustment was made; free text.
    pub reason: Option<String>,
    lines: Vec<DocumentLine>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        kind: DocumentKind,
        counterparty: Option<String>,
        reason: Option<String>,
        created_by: UserId,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            kind,
            status: DocumentStatus::Draft,
            counterparty,
            reason,
            lines: Vec::new(),
            created_by,
            created_at: Utc::now(),
        }
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn lines(&self) -> &[DocumentLine] {
        &self.lines
    }

    /// Add a line. Only draft documents are editable.
    pub fn add_line(&mut self, line: DocumentLine) -> InventoryResult<()> {
        if self.status != DocumentStatus::Draft {
            return Err(InventoryError::validation(format!(
                "lines are editable only in draft (status is {})",
                self.status,
            )));
        }
        line.validate_for(self.kind)?;
        self.lines.push(line);
        Ok(())
    }

    /// draft → waiting. Requires at least one line.
    pub fn submit(&mut self) -> InventoryResult<()> {
        if self.lines.is_empty() {
            return Err(InventoryError::validation("document has no lines"));
        }
        self.transition(DocumentStatus::Waiting)
    }

    /// draft | waiting → canceled. Never touches the ledger.
    pub fn cancel(&mut self) -> InventoryResult<()> {
        self.transition(DocumentStatus::Canceled)
    }

    /// waiting → done. The caller must have committed the movements from
    /// [`Document::movement_requests`] first.
    pub fn mark_done(&mut self) -> InventoryResult<()> {
        self.transition(DocumentStatus::Done)
    }

    /// The movements this document emits on finalization, one per line, all
    /// referencing this document's id.
    ///
    /// Only valid while waiting; in any other status the `→ done` move is an
    /// invalid transition and finalization must not start at all.
    pub fn movement_requests(&self, actor: UserId) -> InventoryResult<Vec<MovementRequest>> {
        if self.status != DocumentStatus::Waiting {
            return Err(self.invalid_transition(DocumentStatus::Done));
        }

        self.lines
            .iter()
            .map(|line| self.request_for(line, actor))
            .collect()
    }

    fn request_for(&self, line: &DocumentLine, actor: UserId) -> InventoryResult<MovementRequest> {
        match self.kind {
            DocumentKind::Receipt => {
                let to = line
                    .to_location
                    .ok_or_else(|| InventoryError::validation("receipt line lost its destination"))?;
                Ok(MovementRequest::receipt(
                    line.sku.clone(),
                    to,
                    line.quantity,
                    self.id,
                    actor,
                ))
            }
            DocumentKind::Delivery => {
                let from = line
                    .from_location
                    .ok_or_else(|| InventoryError::validation("delivery line lost its source"))?;
                Ok(MovementRequest::delivery(
                    line.sku.clone(),
                    from,
                    line.quantity,
                    self.id,
                    actor,
                ))
            }
            DocumentKind::Transfer => {
                let (from, to) = match (line.from_location, line.to_location) {
                    (Some(from), Some(to)) => (from, to),
                    _ => {
                        return Err(InventoryError::validation(
                            "transfer line lost an endpoint",
                        ));
                    }
                };
                Ok(MovementRequest::transfer(
                    line.sku.clone(),
                    from,
                    to,
                    line.quantity,
                    self.id,
                    actor,
                ))
            }
            DocumentKind::Adjustment => {
                let location = line
                    .to_location
                    .ok_or_else(|| InventoryError::validation("adjustment line lost its location"))?;
                MovementRequest::adjustment(line.sku.clone(), location, line.quantity, self.id, actor)
            }
        }
    }

    fn transition(&mut self, to: DocumentStatus) -> InventoryResult<()> {
        if !self.status.can_advance_to(to) {
            return Err(self.invalid_transition(to));
        }
        self.status = to;
        Ok(())
    }

    fn invalid_transition(&self, to: DocumentStatus) -> InventoryError {
        InventoryError::InvalidTransition {
            from: self.status.to_string(),
            to: to.to_string(),
        }
    }
}
