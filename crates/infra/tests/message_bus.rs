//! Black-box tests: allocation messages through the bootstrapped bus.

use std::sync::Arc;

use chrono::NaiveDate;

use allocation_core::{BatchRef, DomainError, OrderId, Sku};
use allocation_domain::{
    Allocate, AllocationCommand, AllocationEvent, AllocationMessage, ChangeBatchQuantity,
    CreateBatch, OutOfStock,
};
use allocation_events::{
    DispatchError, Dispatched, HandlerError, HandlerRegistryBuilder, RegistryError,
};
use allocation_infra::{
    AllocationBus, AllocationConfig, InMemoryNotifications, InMemoryProductStore,
    InMemoryUnitOfWork, bootstrap,
};

struct Harness {
    store: Arc<InMemoryProductStore>,
    notifications: Arc<InMemoryNotifications>,
    bus: AllocationBus<InMemoryUnitOfWork>,
}

impl Harness {
    fn new() -> Self {
        Self::with_notifications(InMemoryNotifications::new())
    }

    fn with_notifications(notifications: InMemoryNotifications) -> Self {
        allocation_observability::init_for_tests();

        let notifications = Arc::new(notifications);
        let bus = bootstrap(&AllocationConfig::default(), notifications.clone()).unwrap();
        Self {
            store: Arc::new(InMemoryProductStore::new()),
            notifications,
            bus,
        }
    }

    fn handle(
        &self,
        message: AllocationMessage,
    ) -> Result<Dispatched<Option<BatchRef>>, DispatchError> {
        let mut uow = InMemoryUnitOfWork::new(self.store.clone());
        self.bus.handle(message, &mut uow)
    }

    fn create_batch(&self, reference: &str, sku: &str, qty: u32, eta: Option<NaiveDate>) {
        self.handle(AllocationMessage::command(CreateBatch {
            reference: batch_ref(reference),
            sku: sku_of(sku),
            qty,
            eta,
        }))
        .unwrap();
    }

    fn allocate(
        &self,
        order_id: &str,
        sku: &str,
        qty: u32,
    ) -> Result<Option<BatchRef>, DispatchError> {
        self.handle(AllocationMessage::command(Allocate {
            order_id: OrderId::new(order_id).unwrap(),
            sku: sku_of(sku),
            qty,
        }))
        .map(|outcome| outcome.into_reply().flatten())
    }

    fn available(&self, sku: &str, reference: &str) -> i64 {
        self.store
            .snapshot(&sku_of(sku))
            .unwrap()
            .unwrap()
            .batch(&batch_ref(reference))
            .unwrap()
            .available_quantity()
    }
}

fn sku_of(value: &str) -> Sku {
    Sku::new(value).unwrap()
}

fn batch_ref(value: &str) -> BatchRef {
    BatchRef::new(value).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

#[test]
fn create_batch_then_allocate_returns_the_batch() {
    let h = Harness::new();
    h.create_batch("batch1", "COMPLICATED-LAMP", 100, None);

    let reference = h.allocate("o1", "COMPLICATED-LAMP", 10).unwrap();

    assert_eq!(reference, Some(batch_ref("batch1")));
    assert_eq!(h.available("COMPLICATED-LAMP", "batch1"), 90);
}

#[test]
fn batches_for_an_existing_product_are_added_to_it() {
    let h = Harness::new();
    h.create_batch("b1", "GARISH-RUG", 100, None);
    h.create_batch("b2", "GARISH-RUG", 99, None);

    let product = h.store.snapshot(&sku_of("GARISH-RUG")).unwrap().unwrap();
    let refs: Vec<_> = product.batches().iter().map(|b| b.reference().as_str()).collect();
    assert_eq!(refs, ["b1", "b2"]);
}

#[test]
fn warehouse_stock_is_preferred_over_shipments() {
    let h = Harness::new();
    h.create_batch("shipment", "RETRO-CLOCK", 100, Some(day(2)));
    h.create_batch("in-stock", "RETRO-CLOCK", 100, None);

    assert_eq!(
        h.allocate("o1", "RETRO-CLOCK", 10).unwrap(),
        Some(batch_ref("in-stock"))
    );
}

#[test]
fn unknown_sku_propagates_the_handler_error() {
    let h = Harness::new();
    h.create_batch("b1", "AREALSKU", 100, None);

    let err = h.allocate("o1", "NONEXISTENTSKU", 10).unwrap_err();

    assert!(matches!(
        err.handler_error(),
        Some(HandlerError::Domain(DomainError::UnknownSku(sku))) if sku == "NONEXISTENTSKU"
    ));
    assert!(err.to_string().contains("Invalid sku NONEXISTENTSKU"));
}

#[test]
fn out_of_stock_sends_a_notification() {
    let h = Harness::new();
    h.create_batch("b1", "POPULAR-CURTAINS", 9, None);

    let reference = h.allocate("o1", "POPULAR-CURTAINS", 10).unwrap();

    assert_eq!(reference, None);
    let sent = h.notifications.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].destination, "stock@made.com");
    assert_eq!(sent[0].message, "Out of stock for POPULAR-CURTAINS");
}

#[test]
fn failing_notifications_do_not_reach_the_caller() {
    let h = Harness::with_notifications(InMemoryNotifications::unavailable("smtp down"));
    h.create_batch("b1", "POPULAR-CURTAINS", 9, None);

    let reference = h.allocate("o1", "POPULAR-CURTAINS", 10).unwrap();

    assert_eq!(reference, None);
    assert!(h.notifications.sent().is_empty());
}

#[test]
fn reducing_a_batch_reallocates_released_lines() {
    let h = Harness::new();
    h.create_batch("in-stock", "INDIFFERENT-TABLE", 50, None);
    h.create_batch("shipment", "INDIFFERENT-TABLE", 50, Some(day(10)));
    h.allocate("o1", "INDIFFERENT-TABLE", 20).unwrap();
    h.allocate("o2", "INDIFFERENT-TABLE", 20).unwrap();
    assert_eq!(h.available("INDIFFERENT-TABLE", "in-stock"), 10);

    h.handle(AllocationMessage::command(ChangeBatchQuantity {
        reference: batch_ref("in-stock"),
        qty: 25,
    }))
    .unwrap();

    assert_eq!(h.available("INDIFFERENT-TABLE", "in-stock"), 5);
    assert_eq!(h.available("INDIFFERENT-TABLE", "shipment"), 30);
}

#[test]
fn changing_an_unknown_batch_fails() {
    let h = Harness::new();

    let err = h
        .handle(AllocationMessage::command(ChangeBatchQuantity {
            reference: batch_ref("missing"),
            qty: 5,
        }))
        .unwrap_err();

    assert!(matches!(
        err.handler_error(),
        Some(HandlerError::Domain(DomainError::NotFound(_)))
    ));
}

#[test]
fn publishing_an_event_directly_runs_its_subscribers() {
    let h = Harness::new();

    let outcome = h
        .handle(AllocationMessage::event(OutOfStock {
            sku: sku_of("LONELY-CHAIR"),
        }))
        .unwrap();

    assert_eq!(outcome, Dispatched::Event);
    assert_eq!(h.notifications.sent().len(), 1);
}

#[test]
fn values_that_are_not_messages_are_rejected() {
    let h = Harness::new();
    let mut uow = InMemoryUnitOfWork::new(h.store.clone());

    let err = h.bus.dispatch_any("allocate please", &mut uow).unwrap_err();

    assert!(matches!(err, DispatchError::InvalidMessageKind { .. }));
}

#[test]
fn incomplete_wiring_is_rejected() {
    type Builder = HandlerRegistryBuilder<AllocationCommand, AllocationEvent, InMemoryUnitOfWork>;

    let result = Builder::default()
        .command::<Allocate, _>(
            "allocate",
            allocation_infra::handlers::allocate::<InMemoryUnitOfWork>,
        )
        .build_complete();

    match result {
        Err(RegistryError::MissingCommandHandler { missing }) => assert_eq!(
            missing,
            ["allocation.batch.create", "allocation.batch.change_quantity"]
        ),
        other => panic!("expected a missing handler error, got {other:?}"),
    }
}
