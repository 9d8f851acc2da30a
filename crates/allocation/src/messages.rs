use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use allocation_core::{BatchRef, OrderId, Sku};
use allocation_events::{Message, impl_command, impl_event};

use crate::batch::OrderLine;

/// Command: CreateBatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBatch {
    pub reference: BatchRef,
    pub sku: Sku,
    pub qty: u32,
    /// `None` for stock already in the warehouse.
    pub eta: Option<NaiveDate>,
}

/// Command: Allocate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocate {
    pub order_id: OrderId,
    pub sku: Sku,
    pub qty: u32,
}

impl Allocate {
    pub fn line(&self) -> OrderLine {
        OrderLine::new(self.order_id.clone(), self.sku.clone(), self.qty)
    }
}

impl From<OrderLine> for Allocate {
    fn from(line: OrderLine) -> Self {
        Self {
            order_id: line.order_id,
            sku: line.sku,
            qty: line.qty,
        }
    }
}

/// Command: ChangeBatchQuantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatchQuantity {
    pub reference: BatchRef,
    pub qty: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationCommand {
    CreateBatch(CreateBatch),
    Allocate(Allocate),
    ChangeBatchQuantity(ChangeBatchQuantity),
}

impl_command!(AllocationCommand, reply = Option<BatchRef>, {
    CreateBatch => "allocation.batch.create",
    Allocate => "allocation.allocate",
    ChangeBatchQuantity => "allocation.batch.change_quantity",
});

/// Event: Allocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocated {
    pub order_id: OrderId,
    pub sku: Sku,
    pub qty: u32,
    pub batch_ref: BatchRef,
}

/// Event: OutOfStock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutOfStock {
    pub sku: Sku,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationEvent {
    Allocated(Allocated),
    OutOfStock(OutOfStock),
}

impl_event!(AllocationEvent, {
    Allocated => "allocation.allocated",
    OutOfStock => "allocation.out_of_stock",
});

pub type AllocationMessage = Message<AllocationCommand, AllocationEvent>;
