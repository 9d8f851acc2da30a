use allocation_core::{AggregateRoot, BatchRef, DomainError, DomainResult, Sku};
use allocation_events::Message;

use crate::batch::{Batch, OrderLine};
use crate::messages::{Allocate, AllocationMessage, Allocated, OutOfStock};

/// Aggregate root: Product.
///
/// Owns every batch of one SKU so allocation decisions are made against a
/// consistent view of stock. Messages raised while handling a request are
/// queued on the aggregate until the unit of work collects them.
#[derive(Debug, Clone)]
pub struct Product {
    sku: Sku,
    batches: Vec<Batch>,
    version: u64,
    messages: Vec<AllocationMessage>,
}

impl Product {
    pub fn new(sku: Sku) -> Self {
        Self::with_batches(sku, Vec::new(), 0)
    }

    pub fn with_batches(sku: Sku, batches: Vec<Batch>, version: u64) -> Self {
        Self {
            sku,
            batches,
            version,
            messages: Vec::new(),
        }
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn batch(&self, reference: &BatchRef) -> Option<&Batch> {
        self.batches.iter().find(|b| b.reference() == reference)
    }

    pub fn add_batch(&mut self, batch: Batch) -> DomainResult<()> {
        if batch.sku() != &self.sku {
            return Err(DomainError::validation(format!(
                "batch {} is for {}, not {}",
                batch.reference(),
                batch.sku(),
                self.sku
            )));
        }
        if self.batch(batch.reference()).is_some() {
            return Err(DomainError::conflict(format!(
                "batch {} already exists",
                batch.reference()
            )));
        }
        self.batches.push(batch);
        self.version += 1;
        Ok(())
    }

    /// Allocate `line` to the preferred batch that can take it.
    ///
    /// Warehouse stock (no ETA) is preferred, then shipments by earliest ETA.
    /// Returns `None` and raises `OutOfStock` when no batch fits.
    pub fn allocate(&mut self, line: OrderLine) -> DomainResult<Option<BatchRef>> {
        if line.sku != self.sku {
            return Err(DomainError::validation(format!(
                "order line for {} sent to product {}",
                line.sku, self.sku
            )));
        }

        let preferred = self
            .batches
            .iter_mut()
            .filter(|b| b.can_allocate(&line))
            .min_by_key(|b| b.eta());

        let Some(batch) = preferred else {
            self.raise(Message::event(OutOfStock {
                sku: line.sku.clone(),
            }));
            return Ok(None);
        };

        let reference = batch.reference().clone();
        batch.allocate(line.clone());
        self.version += 1;
        self.raise(Message::event(Allocated {
            order_id: line.order_id,
            sku: line.sku,
            qty: line.qty,
            batch_ref: reference.clone(),
        }));
        Ok(Some(reference))
    }

    /// Change a batch's purchased quantity.
    ///
    /// Lines that no longer fit are deallocated, most recent first, and an
    /// `Allocate` command is raised for each so they get placed elsewhere.
    pub fn change_batch_quantity(&mut self, reference: &BatchRef, qty: u32) -> DomainResult<()> {
        let batch = self
            .batches
            .iter_mut()
            .find(|b| b.reference() == reference)
            .ok_or_else(|| DomainError::not_found(format!("batch {reference}")))?;

        batch.set_purchased_quantity(qty);
        let mut released = Vec::new();
        while batch.available_quantity() < 0 {
            match batch.deallocate_one() {
                Some(line) => released.push(line),
                None => break,
            }
        }

        self.version += 1;
        for line in released {
            self.raise(Message::command(Allocate::from(line)));
        }
        Ok(())
    }

    /// Messages raised since the last call, oldest first.
    pub fn take_messages(&mut self) -> Vec<AllocationMessage> {
        std::mem::take(&mut self.messages)
    }

    pub fn pending_messages(&self) -> &[AllocationMessage] {
        &self.messages
    }

    pub fn discard_messages(&mut self) {
        self.messages.clear();
    }

    fn raise(&mut self, message: AllocationMessage) {
        self.messages.push(message);
    }
}

impl AggregateRoot for Product {
    type Id = Sku;

    fn id(&self) -> &Self::Id {
        &self.sku
    }

    fn version(&self) -> u64 {
        self.version
    }
}
