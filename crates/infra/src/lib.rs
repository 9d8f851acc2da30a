//! Infrastructure layer: storage, unit of work, handlers, bus wiring and the
//! script driver behind the `allocation` binary.

pub mod bootstrap;
pub mod config;
pub mod handlers;
pub mod notifications;
pub mod repository;
pub mod script;
pub mod unit_of_work;

pub use bootstrap::{AllocationBus, bootstrap};
pub use config::{AllocationConfig, ConfigError};
pub use notifications::{
    InMemoryNotifications, LogNotifications, NotificationError, Notifications, SentNotification,
};
pub use repository::{InMemoryProductStore, ProductRepository, TrackingRepository};
pub use unit_of_work::{AllocationUnitOfWork, InMemoryUnitOfWork, UnitOfWorkError};
