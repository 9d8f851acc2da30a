use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use allocation_core::{BatchRef, Entity, OrderId, Sku, ValueObject};

/// A quantity of one SKU requested by a customer order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderLine {
    pub order_id: OrderId,
    pub sku: Sku,
    pub qty: u32,
}

impl OrderLine {
    pub fn new(order_id: OrderId, sku: Sku, qty: u32) -> Self {
        Self { order_id, sku, qty }
    }
}

impl ValueObject for OrderLine {}

/// Entity: a purchased quantity of one SKU, in the warehouse or on its way.
///
/// Identity is the reference; two batches with the same reference are the same
/// batch whatever their allocations.
#[derive(Debug, Clone)]
pub struct Batch {
    reference: BatchRef,
    sku: Sku,
    eta: Option<NaiveDate>,
    purchased_quantity: u32,
    /// Oldest allocation first.
    allocations: Vec<OrderLine>,
}

impl Batch {
    pub fn new(reference: BatchRef, sku: Sku, qty: u32, eta: Option<NaiveDate>) -> Self {
        Self {
            reference,
            sku,
            eta,
            purchased_quantity: qty,
            allocations: Vec::new(),
        }
    }

    pub fn reference(&self) -> &BatchRef {
        &self.reference
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn eta(&self) -> Option<NaiveDate> {
        self.eta
    }

    pub fn purchased_quantity(&self) -> u32 {
        self.purchased_quantity
    }

    pub fn allocations(&self) -> &[OrderLine] {
        &self.allocations
    }

    pub fn allocated_quantity(&self) -> u64 {
        self.allocations.iter().map(|line| u64::from(line.qty)).sum()
    }

    /// Negative after the purchased quantity is cut below what is allocated.
    pub fn available_quantity(&self) -> i64 {
        i64::from(self.purchased_quantity) - self.allocated_quantity() as i64
    }

    pub fn can_allocate(&self, line: &OrderLine) -> bool {
        self.sku == line.sku && self.available_quantity() >= i64::from(line.qty)
    }

    pub fn is_allocated(&self, line: &OrderLine) -> bool {
        self.allocations.contains(line)
    }

    /// Allocate `line` if it fits. Allocating the same line twice is a no-op.
    pub fn allocate(&mut self, line: OrderLine) {
        if self.can_allocate(&line) && !self.is_allocated(&line) {
            self.allocations.push(line);
        }
    }

    pub fn deallocate(&mut self, line: &OrderLine) {
        self.allocations.retain(|existing| existing != line);
    }

    /// Release the most recent allocation.
    pub fn deallocate_one(&mut self) -> Option<OrderLine> {
        self.allocations.pop()
    }

    pub(crate) fn set_purchased_quantity(&mut self, qty: u32) {
        self.purchased_quantity = qty;
    }
}

impl Entity for Batch {
    type Id = BatchRef;

    fn id(&self) -> &Self::Id {
        &self.reference
    }
}

impl PartialEq for Batch {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl Eq for Batch {}
