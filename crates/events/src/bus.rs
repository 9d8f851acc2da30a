//! Message bus: routes commands and events to their registered handlers.
//!
//! ## Failure policies
//!
//! Commands and events are routed through the same entry point but fail in
//! opposite ways:
//!
//! - **Commands** have exactly one handler. If it fails, the failure is logged
//!   and returned to the caller with the handler's original error attached.
//!   A command with no handler is a wiring defect (`HandlerNotFound`).
//! - **Events** have zero or more handlers, run in registration order. Each
//!   handler's result is captured on its own: a failure is logged and recorded
//!   in the [`EventReport`], and delivery moves on to the next handler. Nothing
//!   a handler does reaches the publisher of the event.
//!
//! ## Draining
//!
//! Handlers raise follow-up messages through the unit of work (an allocation
//! that finds no stock records `OutOfStock`). [`MessageBus::handle`] keeps
//! dispatching until the unit of work has nothing more to hand out:
//!
//! ```text
//! handle(msg) ─▶ queue = [msg]
//!                loop: pop ─▶ dispatch ─▶ queue += uow.collect_new_messages()
//!                until queue is empty
//! ```
//!
//! [`MessageBus::dispatch`] is the single-message primitive without draining.

use std::any::Any;
use std::collections::VecDeque;

use crate::error::{DispatchError, HandlerError};
use crate::registry::HandlerRegistry;
use crate::uow::UnitOfWork;
use crate::{Command, Event, Message};

/// Default bound on messages processed by one `handle` call.
pub const DEFAULT_CASCADE_LIMIT: usize = 1000;

/// Outcome of dispatching one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched<R> {
    /// The command handler's reply, unchanged.
    Command(R),
    /// Events produce no value.
    Event,
}

impl<R> Dispatched<R> {
    /// The command reply, or `None` for an event.
    pub fn into_reply(self) -> Option<R> {
        match self {
            Dispatched::Command(reply) => Some(reply),
            Dispatched::Event => None,
        }
    }
}

/// A handler that failed while an event was being delivered.
#[derive(Debug)]
pub struct EventFailure {
    pub handler: &'static str,
    pub error: HandlerError,
}

/// Delivery bookkeeping for one event.
///
/// Never carries a handler result: events have none.
#[derive(Debug)]
pub struct EventReport {
    pub event_type: &'static str,
    /// Handlers invoked, successful or not.
    pub invoked: usize,
    pub failures: Vec<EventFailure>,
}

impl EventReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// In-process dispatcher over an immutable [`HandlerRegistry`].
///
/// Synchronous: handlers run on the caller's thread, one at a time. The bus
/// holds no per-call state, so a single instance can be shared (e.g. in an
/// `Arc`) as long as each concurrent caller brings its own unit of work.
pub struct MessageBus<C: Command, E: Event, U> {
    registry: HandlerRegistry<C, E, U>,
    cascade_limit: usize,
}

impl<C, E, U> MessageBus<C, E, U>
where
    C: Command,
    E: Event,
{
    pub fn new(registry: HandlerRegistry<C, E, U>) -> Self {
        Self {
            registry,
            cascade_limit: DEFAULT_CASCADE_LIMIT,
        }
    }

    /// Bound the number of messages a single `handle` call may process.
    ///
    /// The submitted message always counts, so a `limit` of 0 is raised to 1.
    pub fn with_cascade_limit(mut self, limit: usize) -> Self {
        self.cascade_limit = limit.max(1);
        self
    }

    pub fn cascade_limit(&self) -> usize {
        self.cascade_limit
    }

    pub fn registry(&self) -> &HandlerRegistry<C, E, U> {
        &self.registry
    }

    /// Dispatch one message to its handler(s), without draining.
    pub fn dispatch(
        &self,
        message: Message<C, E>,
        uow: &mut U,
    ) -> Result<Dispatched<C::Reply>, DispatchError> {
        match message {
            Message::Event(event) => {
                self.dispatch_event(&event, uow);
                Ok(Dispatched::Event)
            }
            Message::Command(command) => self
                .dispatch_command(&command, uow)
                .map(Dispatched::Command),
        }
    }

    /// Dispatch a value whose kind is only known at runtime.
    ///
    /// Fails with [`DispatchError::InvalidMessageKind`] before any handler
    /// lookup when `value` is neither `C`, `E` nor `Message<C, E>`.
    pub fn dispatch_any<T>(
        &self,
        value: T,
        uow: &mut U,
    ) -> Result<Dispatched<C::Reply>, DispatchError>
    where
        T: Any,
    {
        let message = Message::<C, E>::classify(value)?;
        self.dispatch(message, uow)
    }

    /// Deliver an event to every subscribed handler, in registration order.
    pub fn dispatch_event(&self, event: &E, uow: &mut U) -> EventReport {
        let event_type = event.event_type();
        let handlers = self.registry.event_handlers(event_type);
        let mut failures = Vec::new();

        for handler in handlers {
            tracing::debug!(event = ?event, handler = handler.name(), "handling event");

            if let Err(error) = handler.call(event, uow) {
                tracing::error!(
                    event = ?event,
                    handler = handler.name(),
                    error = %error,
                    "exception handling event"
                );
                failures.push(EventFailure {
                    handler: handler.name(),
                    error,
                });
            }
        }

        EventReport {
            event_type,
            invoked: handlers.len(),
            failures,
        }
    }

    /// Run the single handler registered for `command` and return its reply.
    pub fn dispatch_command(&self, command: &C, uow: &mut U) -> Result<C::Reply, DispatchError> {
        let command_type = command.command_type();
        tracing::debug!(command = ?command, "handling command");

        let Some(handler) = self.registry.command_handler(command_type) else {
            tracing::error!(command = ?command, "no handler registered for command");
            return Err(DispatchError::HandlerNotFound { command_type });
        };

        handler.call(command, uow).map_err(|source| {
            tracing::error!(
                command = ?command,
                handler = handler.name(),
                error = %source,
                "exception handling command"
            );
            DispatchError::Handler {
                command_type,
                handler: handler.name(),
                source,
            }
        })
    }
}

impl<C, E, U> MessageBus<C, E, U>
where
    C: Command,
    E: Event,
    U: UnitOfWork<C, E>,
{
    /// Dispatch `message`, then every message its handlers raise, until the
    /// unit of work reports none pending.
    ///
    /// Returns the outcome of `message` itself. A failing command anywhere in
    /// the cascade aborts the loop and is returned; messages still queued at
    /// that point are dropped.
    pub fn handle(
        &self,
        message: Message<C, E>,
        uow: &mut U,
    ) -> Result<Dispatched<C::Reply>, DispatchError> {
        let outcome = self.dispatch(message, uow)?;

        let mut queue: VecDeque<Message<C, E>> = uow.collect_new_messages().into();
        let mut processed = 1;

        while let Some(next) = queue.pop_front() {
            if processed >= self.cascade_limit {
                tracing::error!(
                    limit = self.cascade_limit,
                    pending = queue.len() + 1,
                    "message cascade limit exceeded"
                );
                return Err(DispatchError::CascadeLimitExceeded {
                    limit: self.cascade_limit,
                });
            }
            processed += 1;

            if let Err(err) = self.dispatch(next, uow) {
                if !queue.is_empty() {
                    tracing::warn!(dropped = queue.len(), "dropping queued messages after failure");
                }
                return Err(err);
            }
            queue.extend(uow.collect_new_messages());
        }

        Ok(outcome)
    }
}

impl<C: Command, E: Event, U> core::fmt::Debug for MessageBus<C, E, U> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MessageBus")
            .field("registry", &self.registry)
            .field("cascade_limit", &self.cascade_limit)
            .finish()
    }
}
