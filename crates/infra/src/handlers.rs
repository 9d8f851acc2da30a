//! Handlers for allocation commands and events.
//!
//! Command handlers run inside one transaction: the unit of work is committed
//! when the handler body succeeds and rolled back when it fails.

use allocation_core::{BatchRef, DomainError};
use allocation_domain::{Allocate, Batch, ChangeBatchQuantity, CreateBatch, OutOfStock, Product};
use allocation_events::HandlerError;

use crate::notifications::Notifications;
use crate::repository::ProductRepository;
use crate::unit_of_work::AllocationUnitOfWork;

/// Run `work`, then commit; roll back if either fails.
pub fn transactionally<U, T>(
    uow: &mut U,
    work: impl FnOnce(&mut U) -> Result<T, HandlerError>,
) -> Result<T, HandlerError>
where
    U: AllocationUnitOfWork,
{
    let result = work(uow).and_then(|value| {
        uow.commit()?;
        Ok(value)
    });
    if result.is_err() {
        uow.rollback();
    }
    result
}

pub fn add_batch<U>(cmd: &CreateBatch, uow: &mut U) -> Result<Option<BatchRef>, HandlerError>
where
    U: AllocationUnitOfWork,
{
    transactionally(uow, |uow| {
        let products = uow.products();
        if products.get(&cmd.sku)?.is_none() {
            products.add(Product::new(cmd.sku.clone()))?;
        }
        let product = products
            .get(&cmd.sku)?
            .ok_or_else(|| DomainError::unknown_sku(cmd.sku.as_str()))?;

        product.add_batch(Batch::new(
            cmd.reference.clone(),
            cmd.sku.clone(),
            cmd.qty,
            cmd.eta,
        ))?;
        Ok(None)
    })
}

pub fn allocate<U>(cmd: &Allocate, uow: &mut U) -> Result<Option<BatchRef>, HandlerError>
where
    U: AllocationUnitOfWork,
{
    let line = cmd.line();
    transactionally(uow, |uow| {
        let product = uow
            .products()
            .get(&line.sku)?
            .ok_or_else(|| DomainError::unknown_sku(line.sku.as_str()))?;
        Ok(product.allocate(line)?)
    })
}

pub fn change_batch_quantity<U>(
    cmd: &ChangeBatchQuantity,
    uow: &mut U,
) -> Result<Option<BatchRef>, HandlerError>
where
    U: AllocationUnitOfWork,
{
    transactionally(uow, |uow| {
        let product = uow
            .products()
            .get_by_batch_ref(&cmd.reference)?
            .ok_or_else(|| DomainError::not_found(format!("batch {}", cmd.reference)))?;
        product.change_batch_quantity(&cmd.reference, cmd.qty)?;
        Ok(None)
    })
}

pub fn send_out_of_stock_notification(
    event: &OutOfStock,
    notifications: &dyn Notifications,
    destination: &str,
) -> Result<(), HandlerError> {
    notifications.send(destination, &format!("Out of stock for {}", event.sku))?;
    Ok(())
}
