//! Allocation domain module.
//!
//! Business rules for allocating order lines to batches of stock, implemented
//! as deterministic domain logic (no IO, no storage). The commands and events
//! the message bus routes are defined here too.

pub mod batch;
pub mod messages;
pub mod product;

pub use batch::{Batch, OrderLine};
pub use messages::{
    Allocate, AllocationCommand, AllocationEvent, AllocationMessage, Allocated,
    ChangeBatchQuantity, CreateBatch, OutOfStock,
};
pub use product::Product;
