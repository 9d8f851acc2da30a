//! Unit of work: transaction boundary around product changes.
//!
//! Handlers load products through [`AllocationUnitOfWork::products`], mutate
//! them, then `commit`. Nothing reaches the shared store before `commit`;
//! `rollback` throws the working copies away together with any messages they
//! raised, so a failed transaction publishes nothing. Messages from changes
//! that were already committed stay queued until collected.

use std::sync::Arc;

use thiserror::Error;

use allocation_core::{DomainError, Sku};
use allocation_domain::{AllocationCommand, AllocationEvent, AllocationMessage};
use allocation_events::{HandlerError, UnitOfWork};

use crate::repository::{InMemoryProductStore, ProductRepository, TrackingRepository};

#[derive(Debug, Error)]
pub enum UnitOfWorkError {
    /// Another unit of work committed the product first.
    #[error("concurrent update of product {sku}: {source}")]
    Concurrency {
        sku: Sku,
        #[source]
        source: DomainError,
    },

    #[error("product {0} already exists")]
    Duplicate(Sku),

    #[error("product store lock poisoned")]
    Poisoned,
}

impl From<UnitOfWorkError> for HandlerError {
    fn from(value: UnitOfWorkError) -> Self {
        HandlerError::UnitOfWork(Box::new(value))
    }
}

/// What allocation handlers need from a unit of work.
pub trait AllocationUnitOfWork: UnitOfWork<AllocationCommand, AllocationEvent> {
    type Products: ProductRepository;

    fn products(&mut self) -> &mut Self::Products;

    fn commit(&mut self) -> Result<(), UnitOfWorkError>;

    /// Discard uncommitted changes. Safe to call after `commit`.
    fn rollback(&mut self);
}

/// Unit of work over an [`InMemoryProductStore`].
///
/// `commit` moves the messages raised by committed products into an outbox;
/// `collect_new_messages` drains that outbox. A later `rollback` only drops
/// working copies, so messages from earlier commits survive it.
#[derive(Debug)]
pub struct InMemoryUnitOfWork {
    products: TrackingRepository,
    /// Messages from committed changes, oldest first.
    outbox: Vec<AllocationMessage>,
}

impl InMemoryUnitOfWork {
    pub fn new(store: Arc<InMemoryProductStore>) -> Self {
        Self {
            products: TrackingRepository::new(store),
            outbox: Vec::new(),
        }
    }
}

impl AllocationUnitOfWork for InMemoryUnitOfWork {
    type Products = TrackingRepository;

    fn products(&mut self) -> &mut Self::Products {
        &mut self.products
    }

    fn commit(&mut self) -> Result<(), UnitOfWorkError> {
        self.products.commit()?;
        self.outbox
            .extend(self.products.seen_mut().flat_map(|product| product.take_messages()));
        Ok(())
    }

    fn rollback(&mut self) {
        tracing::debug!(
            products = self.products.seen().count(),
            "rolling back unit of work"
        );
        self.products.discard();
    }
}

impl UnitOfWork<AllocationCommand, AllocationEvent> for InMemoryUnitOfWork {
    fn collect_new_messages(&mut self) -> Vec<AllocationMessage> {
        std::mem::take(&mut self.outbox)
    }
}
