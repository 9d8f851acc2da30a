//! Wiring: builds the allocation message bus from config and collaborators.

use std::sync::Arc;

use allocation_domain::{
    Allocate, AllocationCommand, AllocationEvent, ChangeBatchQuantity, CreateBatch, OutOfStock,
};
use allocation_events::{HandlerRegistry, MessageBus, RegistryError};

use crate::config::AllocationConfig;
use crate::handlers;
use crate::notifications::Notifications;
use crate::unit_of_work::AllocationUnitOfWork;

pub type AllocationBus<U> = MessageBus<AllocationCommand, AllocationEvent, U>;

/// Register every allocation handler and return the bus.
///
/// Fails if any command is left without exactly one handler. `Allocated` has
/// no subscribers.
pub fn bootstrap<U>(
    config: &AllocationConfig,
    notifications: Arc<dyn Notifications>,
) -> Result<AllocationBus<U>, RegistryError>
where
    U: AllocationUnitOfWork + 'static,
{
    let destination = config.notify_address.clone();

    let registry = HandlerRegistry::builder()
        .command::<CreateBatch, _>("add_batch", handlers::add_batch::<U>)
        .command::<Allocate, _>("allocate", handlers::allocate::<U>)
        .command::<ChangeBatchQuantity, _>(
            "change_batch_quantity",
            handlers::change_batch_quantity::<U>,
        )
        .event::<OutOfStock, _>(
            "send_out_of_stock_notification",
            move |event: &OutOfStock, _uow: &mut U| {
                handlers::send_out_of_stock_notification(
                    event,
                    notifications.as_ref(),
                    &destination,
                )
            },
        )
        .build_complete()?;

    tracing::info!(
        commands = registry.command_types().count(),
        cascade_limit = config.cascade_limit,
        notify_address = %config.notify_address,
        "allocation message bus ready"
    );

    Ok(MessageBus::new(registry).with_cascade_limit(config.cascade_limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocation_domain::Allocated;
    use allocation_events::{CommandVariant, EventVariant};

    use crate::notifications::InMemoryNotifications;
    use crate::unit_of_work::InMemoryUnitOfWork;

    fn bus() -> AllocationBus<InMemoryUnitOfWork> {
        let notifications = Arc::new(InMemoryNotifications::new());
        bootstrap(&AllocationConfig::default(), notifications).unwrap()
    }

    #[test]
    fn every_command_has_a_handler() {
        let bus = bus();
        let command_types = [
            CreateBatch::COMMAND_TYPE,
            Allocate::COMMAND_TYPE,
            ChangeBatchQuantity::COMMAND_TYPE,
        ];
        for command_type in command_types {
            assert!(
                bus.registry().command_handler(command_type).is_some(),
                "{command_type}"
            );
        }
    }

    #[test]
    fn out_of_stock_has_one_subscriber_and_allocated_none() {
        let bus = bus();
        let names: Vec<_> = bus
            .registry()
            .event_handlers(OutOfStock::EVENT_TYPE)
            .iter()
            .map(|h| h.name())
            .collect();
        assert_eq!(names, ["send_out_of_stock_notification"]);
        assert!(bus.registry().event_handlers(Allocated::EVENT_TYPE).is_empty());
    }

    #[test]
    fn cascade_limit_comes_from_config() {
        let config = AllocationConfig {
            cascade_limit: 7,
            ..AllocationConfig::default()
        };
        let bus: AllocationBus<InMemoryUnitOfWork> =
            bootstrap(&config, Arc::new(InMemoryNotifications::new())).unwrap();
        assert_eq!(bus.cascade_limit(), 7);
    }
}
