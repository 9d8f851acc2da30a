//! Commands, events and the in-process message bus that routes them.
//!
//! - [`Command`] / [`Event`]: traits for application message enums
//! - [`Message`]: the command-or-event tagged union
//! - [`HandlerRegistry`]: immutable routing table built at wiring time
//! - [`MessageBus`]: dispatch entry point with per-kind failure policies
//! - [`UnitOfWork`]: what the bus needs from the transactional collaborator

pub mod bus;
pub mod command;
pub mod error;
pub mod event;
pub mod handler;
pub mod message;
pub mod registry;
pub mod uow;

pub use bus::{DEFAULT_CASCADE_LIMIT, Dispatched, EventFailure, EventReport, MessageBus};
pub use command::{Command, CommandVariant};
pub use error::{DispatchError, HandlerError, RegistryError};
pub use event::{Event, EventVariant};
pub use handler::{CommandHandler, EventHandler};
pub use message::{Message, MessageKind};
pub use registry::{HandlerRegistry, HandlerRegistryBuilder};
pub use uow::UnitOfWork;
